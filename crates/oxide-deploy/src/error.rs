//! Error types for deployment and the command pipeline.

use oxide_change::error::{ChangeError, ChecksumError, DialectError, ResolveError};

/// Errors raised while deploying changes to a target.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The lock could not be acquired before the timeout.
    #[error("Timed out after {waited_ms} ms waiting for the lock on '{target}' (held by {holder})")]
    LockTimeout {
        /// Target name.
        target: String,
        /// How long acquisition was attempted.
        waited_ms: u64,
        /// Session holding the lock, as recorded in the lock table.
        holder: String,
    },

    /// The lock is held by another session.
    #[error("Lock on '{target}' is held by {holder}")]
    LockContention {
        /// Target name.
        target: String,
        /// Session holding the lock.
        holder: String,
    },

    /// A lock token was used after release or against another target.
    #[error("Lock for '{target}' is not held by this session")]
    LockNotHeld {
        /// Target name.
        target: String,
    },

    /// A recorded change set no longer matches its definition.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    /// A statement failed on the target.
    #[error("Failed to execute on '{target}': {sql}: {source}")]
    Execution {
        /// Target name.
        target: String,
        /// The failing SQL.
        sql: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A drop failed for a reason other than the object being absent.
    #[error("Cleanup of '{target}' failed on {sql}: {source}")]
    Cleanup {
        /// Target name.
        target: String,
        /// The failing SQL.
        sql: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The target URL names a dialect this runtime cannot connect to.
    #[error("Cannot connect to '{url}': {dialect} targets are not supported by this runtime")]
    UnsupportedTarget {
        /// Connection URL.
        url: String,
        /// Dialect resolved from the URL.
        dialect: String,
    },

    /// No generator could render a statement.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A change is misconfigured.
    #[error(transparent)]
    Change(#[from] ChangeError),

    /// Dialect lookup failed.
    #[error(transparent)]
    Dialect(#[from] DialectError),

    /// Database error outside statement execution.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (changelogs, large-object files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

/// Errors raised while planning or running a command pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No command with that name or alias.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// An argument is unknown, missing or malformed.
    #[error("Invalid argument '{argument}' for command '{command}': {message}")]
    InvalidArgument {
        /// Command name.
        command: String,
        /// Argument name.
        argument: String,
        /// What is wrong.
        message: String,
    },

    /// A step requires a result nothing provides.
    #[error("Step '{step}' of command '{command}' requires '{result}', which no step provides")]
    UnsatisfiedRequirement {
        /// Command name.
        command: String,
        /// Step with the requirement.
        step: String,
        /// Required result name.
        result: String,
    },

    /// The steps' requirements form a cycle.
    #[error("Steps of command '{command}' depend on each other: {}", .steps.join(", "))]
    Cycle {
        /// Command name.
        command: String,
        /// Steps left unordered.
        steps: Vec<String>,
    },

    /// A required result was absent at run time.
    #[error("Result '{0}' is missing")]
    MissingResult(&'static str),

    /// A result was added twice without overwrite.
    #[error("Result '{0}' was already provided")]
    DuplicateResult(&'static str),

    /// A result holds a value of another type.
    #[error("Result '{name}' is not a {expected}")]
    ResultType {
        /// Result name.
        name: &'static str,
        /// Expected type name.
        expected: &'static str,
    },

    /// A step failed; the remaining steps did not run.
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        /// Step name.
        step: String,
        /// The step's error.
        #[source]
        source: Box<PipelineError>,
    },

    /// Deployment failure inside a step.
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

impl PipelineError {
    /// Returns the innermost error, looking through step failures.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failure_root() {
        let err = PipelineError::StepFailed {
            step: "lock".into(),
            source: Box::new(PipelineError::Deploy(DeployError::LockTimeout {
                target: "main".into(),
                waited_ms: 10,
                holder: "other".into(),
            })),
        };
        assert!(matches!(
            err.root(),
            PipelineError::Deploy(DeployError::LockTimeout { .. })
        ));
        assert_eq!(
            err.to_string(),
            "Step 'lock' failed: Timed out after 10 ms waiting for the lock on 'main' (held by other)"
        );
    }

    #[test]
    fn test_cycle_message() {
        let err = PipelineError::Cycle {
            command: "update".into(),
            steps: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Steps of command 'update' depend on each other: a, b");
    }
}
