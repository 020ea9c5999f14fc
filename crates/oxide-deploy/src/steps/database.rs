//! Connection and changelog loading steps.

use std::path::Path;

use crate::changelog::ChangeLog;
use crate::pipeline::{
    ArgumentDefinition, ArgumentType, BoxFuture, CommandScope, CommandStep, PipelineResults,
    ResultType, StepResult,
};
use crate::target::Target;

use super::{CHANGELOG, TARGET};

const DATABASE_ARGUMENTS: &[ArgumentDefinition] = &[ArgumentDefinition::new("url", ArgumentType::String)
    .description("Connection URL; defaults to the configured URL")];

const CHANGELOG_ARGUMENTS: &[ArgumentDefinition] = &[ArgumentDefinition::new(
    "changelogFile",
    ArgumentType::String,
)
.required()
.description("JSON changelog to apply")];

/// Connects to the target named by `url`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseStep;

impl CommandStep for DatabaseStep {
    fn name(&self) -> &'static str {
        "database"
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![TARGET.result_type()]
    }

    fn arguments(&self) -> &'static [ArgumentDefinition] {
        DATABASE_ARGUMENTS
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let url = scope
                .arguments
                .string("url")
                .unwrap_or(&scope.ctx.config.url);
            let target = Target::connect(scope.ctx, url).await?;
            results.add(TARGET, target)?;
            Ok(())
        })
    }

    fn cleanup<'a>(
        &'a self,
        _scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            if let Some(target) = results.get(TARGET)? {
                target.close().await;
            }
            Ok(())
        })
    }
}

/// Reads the changelog named by `changelogFile`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeLogStep;

impl CommandStep for ChangeLogStep {
    fn name(&self) -> &'static str {
        "changelog"
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![CHANGELOG.result_type()]
    }

    fn arguments(&self) -> &'static [ArgumentDefinition] {
        CHANGELOG_ARGUMENTS
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let path = scope.arguments.string("changelogFile").unwrap_or_default();
            let changelog = ChangeLog::from_json_file(Path::new(path))?;
            results.add(CHANGELOG, changelog)?;
            Ok(())
        })
    }
}
