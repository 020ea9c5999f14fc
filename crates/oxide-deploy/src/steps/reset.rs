//! The `dropAll` step.

use std::sync::Arc;

use oxide_change::prelude::TableRef;

use crate::cleanup::Cleanup;
use crate::ledger::Ledger;
use crate::pipeline::{
    ArgumentDefinition, ArgumentType, BoxFuture, CommandScope, CommandStep, PipelineResults,
    ResultType, StepResult,
};

use super::{CLEANUP_REPORT, LOCK, TARGET};

const ARGUMENTS: &[ArgumentDefinition] = &[ArgumentDefinition::new("objects", ArgumentType::StringList)
    .description("Tables to drop before the ledger, as name or schema.name")];

/// Drops the listed tables and the ledger under the target lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetStep;

impl CommandStep for ResetStep {
    fn name(&self) -> &'static str {
        "reset"
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["dropAll"]
    }

    fn requires(&self) -> Vec<ResultType> {
        vec![TARGET.result_type(), LOCK.result_type()]
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![CLEANUP_REPORT.result_type()]
    }

    fn arguments(&self) -> &'static [ArgumentDefinition] {
        ARGUMENTS
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let target = results.require(TARGET)?.clone();
            let lock = Arc::clone(results.require(LOCK)?);
            let ledger = Ledger::for_target(scope.ctx, &target);
            let objects = scope.arguments.list("objects").iter().map(|o| parse_table(o));
            let report = Cleanup::new(&target, &ledger)
                .objects(objects)
                .run(&lock)
                .await?;
            results.add(CLEANUP_REPORT, report)?;
            Ok(())
        })
    }
}

fn parse_table(name: &str) -> TableRef {
    match name.split_once('.') {
        Some((schema, table)) => TableRef::new(table).in_schema(schema),
        None => TableRef::new(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        assert_eq!(parse_table("users"), TableRef::new("users"));
        assert_eq!(parse_table("app.users"), TableRef::new("users").in_schema("app"));
    }
}
