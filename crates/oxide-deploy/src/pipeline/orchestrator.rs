//! Planning and running command pipelines.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::command::{ArgumentDefinition, CommandArguments, CommandDefinition};
use super::results::PipelineResults;
use super::{CommandScope, CommandStep};
use crate::context::DeployContext;
use crate::error::PipelineError;

/// Registered commands and steps.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandDefinition>,
    steps: Vec<Arc<dyn CommandStep>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let commands: Vec<_> = self.commands.iter().map(CommandDefinition::name).collect();
        let steps: Vec<_> = self.steps.iter().map(|s| s.name()).collect();
        f.debug_struct("CommandRegistry")
            .field("commands", &commands)
            .field("steps", &steps)
            .finish()
    }
}

/// A planned command: its steps in execution order and every argument
/// they accept.
pub struct Pipeline<'r> {
    command: &'r CommandDefinition,
    steps: Vec<&'r dyn CommandStep>,
    arguments: Vec<ArgumentDefinition>,
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("command", &self.command.name())
            .field("steps", &self.step_names())
            .finish_non_exhaustive()
    }
}

impl<'r> Pipeline<'r> {
    /// Returns the command.
    #[must_use]
    pub fn command(&self) -> &'r CommandDefinition {
        self.command
    }

    /// Returns step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns the arguments of the command and all its steps.
    #[must_use]
    pub fn arguments(&self) -> &[ArgumentDefinition] {
        &self.arguments
    }
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    pub fn register_command(&mut self, command: CommandDefinition) {
        self.commands.push(command);
    }

    /// Registers a step. Registration order breaks ordering ties and picks
    /// between helpers providing the same result.
    pub fn register_step<S: CommandStep + 'static>(&mut self, step: S) {
        self.steps.push(Arc::new(step));
    }

    /// Returns the registered commands.
    #[must_use]
    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    /// Finds a command by name or alias.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownCommand`].
    pub fn command(&self, name: &str) -> Result<&CommandDefinition, PipelineError> {
        self.commands
            .iter()
            .find(|c| c.answers_to(name))
            .ok_or_else(|| PipelineError::UnknownCommand(name.to_string()))
    }

    /// Plans a command without running it.
    ///
    /// The command's own steps are selected first. Each requirement not in
    /// `seeded` and not provided by a selected step pulls in the first
    /// registered step providing it. Steps are then ordered so providers run
    /// before the steps requiring their results.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownCommand`],
    /// [`PipelineError::UnsatisfiedRequirement`] when nothing provides a
    /// required result, or [`PipelineError::Cycle`].
    pub fn plan(&self, name: &str, seeded: &HashSet<&str>) -> Result<Pipeline<'_>, PipelineError> {
        let command = self.command(name)?;

        let mut selected: Vec<usize> = self
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.command_names().contains(&command.name()))
            .map(|(i, _)| i)
            .collect();

        let mut cursor = 0;
        while cursor < selected.len() {
            let step = &self.steps[selected[cursor]];
            for required in step.requires() {
                if seeded.contains(required.name) || self.provided_by(&selected, required.name) {
                    continue;
                }
                let helper = self
                    .steps
                    .iter()
                    .position(|s| s.provides().iter().any(|p| p.name == required.name))
                    .ok_or_else(|| PipelineError::UnsatisfiedRequirement {
                        command: command.name().to_string(),
                        step: step.name().to_string(),
                        result: required.name.to_string(),
                    })?;
                debug!(command = command.name(), step = self.steps[helper].name(), "Adding helper step");
                selected.push(helper);
            }
            cursor += 1;
        }

        let order = self.order(command, &selected)?;

        let mut arguments: Vec<ArgumentDefinition> = command.arguments().to_vec();
        for &index in &order {
            for argument in self.steps[index].arguments() {
                if !arguments.iter().any(|a| a.name == argument.name) {
                    arguments.push(*argument);
                }
            }
        }

        Ok(Pipeline {
            command,
            steps: order.into_iter().map(|i| &*self.steps[i]).collect(),
            arguments,
        })
    }

    fn provided_by(&self, selected: &[usize], name: &str) -> bool {
        selected
            .iter()
            .any(|&i| self.steps[i].provides().iter().any(|p| p.name == name))
    }

    /// Kahn's algorithm over the selected steps, lowest registration index
    /// first among ready steps.
    fn order(&self, command: &CommandDefinition, selected: &[usize]) -> Result<Vec<usize>, PipelineError> {
        let mut dependencies: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for &step in selected {
            let mut needs = BTreeSet::new();
            for required in self.steps[step].requires() {
                for &provider in selected {
                    if provider != step
                        && self.steps[provider]
                            .provides()
                            .iter()
                            .any(|p| p.name == required.name)
                    {
                        needs.insert(provider);
                    }
                }
            }
            dependencies.insert(step, needs);
        }

        let mut ready: BTreeSet<usize> = dependencies
            .iter()
            .filter(|(_, needs)| needs.is_empty())
            .map(|(&step, _)| step)
            .collect();
        let mut order = Vec::with_capacity(dependencies.len());

        while let Some(step) = ready.pop_first() {
            dependencies.remove(&step);
            order.push(step);
            for (&other, needs) in &mut dependencies {
                if needs.remove(&step) && needs.is_empty() {
                    ready.insert(other);
                }
            }
        }

        if dependencies.is_empty() {
            Ok(order)
        } else {
            Err(PipelineError::Cycle {
                command: command.name().to_string(),
                steps: dependencies
                    .keys()
                    .map(|&i| self.steps[i].name().to_string())
                    .collect(),
            })
        }
    }

    /// Plans and runs a command.
    ///
    /// Arguments are validated before any step runs. The first failing step
    /// stops the run; cleanup hooks of every step that started then run in
    /// reverse order.
    ///
    /// # Errors
    ///
    /// Returns any planning or argument error, or
    /// [`PipelineError::StepFailed`] wrapping the failing step's error.
    pub async fn run(
        &self,
        ctx: &DeployContext,
        name: &str,
        arguments: &BTreeMap<String, String>,
        seed: PipelineResults,
    ) -> Result<PipelineResults, PipelineError> {
        let seeded: HashSet<&str> = self
            .steps
            .iter()
            .flat_map(|s| s.requires())
            .map(|r| r.name)
            .filter(|result| seed.contains(result))
            .collect();
        let pipeline = self.plan(name, &seeded)?;
        let arguments = CommandArguments::bind(pipeline.command.name(), &pipeline.arguments, arguments)?;
        let scope = CommandScope {
            ctx,
            command: pipeline.command,
            arguments: &arguments,
        };

        info!(command = pipeline.command.name(), steps = ?pipeline.step_names(), "Running command");
        let mut results = seed;
        let mut started = Vec::with_capacity(pipeline.steps.len());
        let mut failure = None;

        for step in &pipeline.steps {
            started.push(*step);
            debug!(step = step.name(), "Running step");
            if let Err(source) = step.run(scope, &mut results).await {
                failure = Some(PipelineError::StepFailed {
                    step: step.name().to_string(),
                    source: Box::new(source),
                });
                break;
            }
        }

        for step in started.iter().rev() {
            if let Err(e) = step.cleanup(scope, &mut results).await {
                warn!(step = step.name(), error = %e, "Step cleanup failed");
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}
