//! The deployment context shared by sessions and pipeline steps.

use oxide_change::ChangeContext;

use crate::config::DeployConfig;

/// Registries and configuration, built once at start-up.
#[derive(Debug, Clone, Default)]
pub struct DeployContext {
    /// Dialects and generators.
    pub changes: ChangeContext,
    /// Deployment settings.
    pub config: DeployConfig,
}

impl DeployContext {
    /// Creates a context.
    #[must_use]
    pub fn new(changes: ChangeContext, config: DeployConfig) -> Self {
        Self { changes, config }
    }

    /// Creates a context with the built-in registries.
    #[must_use]
    pub fn standard(config: DeployConfig) -> Self {
        Self::new(ChangeContext::standard(), config)
    }
}
