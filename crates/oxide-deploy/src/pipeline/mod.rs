//! Command pipelines.
//!
//! A command runs as an ordered pipeline of [`CommandStep`]s. Each step
//! declares the results it requires and provides; the
//! [`CommandRegistry`] pulls in helper steps for missing requirements,
//! orders the steps topologically and threads a [`PipelineResults`] map
//! through them. Steps that ran get their cleanup hook in reverse order,
//! on success and on failure.

pub mod command;
pub mod orchestrator;
pub mod results;

pub use command::{
    ArgumentDefinition, ArgumentType, ArgumentValue, CommandArguments, CommandBuilder,
    CommandDefinition, ResultDefinition,
};
pub use futures::future::BoxFuture;
pub use orchestrator::{CommandRegistry, Pipeline};
pub use results::{PipelineResults, ResultKey, ResultType};

use crate::context::DeployContext;
use crate::error::PipelineError;

/// Result type of step hooks.
pub type StepResult = Result<(), PipelineError>;

/// What a step sees of the running command.
#[derive(Debug, Clone, Copy)]
pub struct CommandScope<'a> {
    /// Deployment context.
    pub ctx: &'a DeployContext,
    /// Command being run.
    pub command: &'a CommandDefinition,
    /// Bound arguments of the whole pipeline.
    pub arguments: &'a CommandArguments,
}

/// One unit of a command pipeline.
pub trait CommandStep: Send + Sync {
    /// Step name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Commands this step belongs to. Empty for helper steps, which join a
    /// pipeline only to provide a result another step requires.
    fn command_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Results this step reads.
    fn requires(&self) -> Vec<ResultType> {
        Vec::new()
    }

    /// Results this step adds.
    fn provides(&self) -> Vec<ResultType> {
        Vec::new()
    }

    /// Arguments this step accepts.
    fn arguments(&self) -> &'static [ArgumentDefinition] {
        &[]
    }

    /// Runs the step.
    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult>;

    /// Releases what the step acquired. Runs for every step that started.
    fn cleanup<'a>(
        &'a self,
        _scope: CommandScope<'a>,
        _results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async { Ok(()) })
    }
}
