//! The explicit registry context.

use crate::dialect::DialectRegistry;
use crate::generator::GeneratorRegistry;

/// Dialects and generators, built once at start-up and read-only afterwards.
///
/// Every component that needs registry access receives a context; there is
/// no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct ChangeContext {
    dialects: DialectRegistry,
    generators: GeneratorRegistry,
}

impl ChangeContext {
    /// Creates a context from explicit registries.
    #[must_use]
    pub fn new(dialects: DialectRegistry, generators: GeneratorRegistry) -> Self {
        Self {
            dialects,
            generators,
        }
    }

    /// Creates a context with every built-in dialect and generator.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(DialectRegistry::standard(), GeneratorRegistry::standard())
    }

    /// Returns the dialect registry.
    #[must_use]
    pub fn dialects(&self) -> &DialectRegistry {
        &self.dialects
    }

    /// Returns the generator registry.
    #[must_use]
    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }
}
