//! Generator registration and resolution.

use std::sync::Arc;

use tracing::debug;

use super::{
    CreateSequenceGenerator, CreateTableGenerator, DropSequenceGenerator, DropTableGenerator,
    Generator, InsertGenerator, PreparedInsertGenerator, Sql, SqliteCreateTableGenerator,
};
use crate::dialect::Dialect;
use crate::error::{ResolveError, ValidationErrors};
use crate::statement::{Statement, StatementKind};

/// All known generators, ordered for resolution.
///
/// Generators are kept sorted by descending priority. The sort is stable, so
/// among generators of equal priority the one registered first wins.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: Vec<Arc<dyn Generator>>,
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.generators.iter().map(|g| (g.name(), g.priority())))
            .finish()
    }
}

impl GeneratorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in generator.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(InsertGenerator);
        registry.register(PreparedInsertGenerator);
        registry.register(CreateTableGenerator);
        registry.register(SqliteCreateTableGenerator);
        registry.register(DropTableGenerator);
        registry.register(CreateSequenceGenerator);
        registry.register(DropSequenceGenerator);
        registry
    }

    /// Registers a generator.
    pub fn register<G: Generator + 'static>(&mut self, generator: G) {
        self.register_arc(Arc::new(generator));
    }

    /// Registers a shared generator.
    pub fn register_arc(&mut self, generator: Arc<dyn Generator>) {
        self.generators.push(generator);
        self.generators.sort_by_key(|g| std::cmp::Reverse(g.priority()));
    }

    /// Returns the generators for a kind in resolution order.
    pub fn candidates(&self, kind: StatementKind) -> impl Iterator<Item = &dyn Generator> + '_ {
        self.generators
            .iter()
            .filter(move |g| g.kind() == kind)
            .map(|g| &**g)
    }

    /// Selects the generator for a statement on a dialect.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unsupported`] when no generator supports the
    /// statement, or [`ResolveError::Invalid`] with the errors of the
    /// highest-priority supporting generator when none validates.
    pub fn resolve(
        &self,
        statement: &Statement,
        dialect: &Dialect,
    ) -> Result<&dyn Generator, ResolveError> {
        let kind = statement.kind();
        let mut first_errors: Option<ValidationErrors> = None;

        for generator in self.candidates(kind) {
            if !generator.supports(statement, dialect) {
                continue;
            }
            let errors = generator.validate(statement, dialect);
            if !errors.has_errors() {
                debug!(
                    generator = generator.name(),
                    kind = %kind,
                    dialect = dialect.name(),
                    "Resolved generator"
                );
                return Ok(generator);
            }
            if first_errors.is_none() {
                first_errors = Some(errors);
            }
        }

        match first_errors {
            Some(errors) => Err(ResolveError::Invalid {
                kind,
                dialect: dialect.name().to_string(),
                errors,
            }),
            None => Err(ResolveError::Unsupported {
                kind,
                dialect: dialect.name().to_string(),
            }),
        }
    }

    /// Resolves and renders a statement, applying its prologue and epilogue.
    ///
    /// # Errors
    ///
    /// Returns any resolution error, or [`ResolveError::Render`] if the
    /// selected generator fails.
    pub fn generate_sql(
        &self,
        statement: &Statement,
        dialect: &Dialect,
    ) -> Result<Vec<Sql>, ResolveError> {
        let generator = self.resolve(statement, dialect)?;
        let mut fragments =
            generator
                .generate(statement, dialect)
                .map_err(|source| ResolveError::Render {
                    kind: statement.kind(),
                    dialect: dialect.name().to_string(),
                    source,
                })?;

        let options = statement.options();
        if let Some(prologue) = non_blank(options.prologue.as_deref()) {
            if let Some(first) = fragments.first_mut() {
                *first = format!("{prologue} {first}");
            }
        }
        if let Some(epilogue) = non_blank(options.epilogue.as_deref()) {
            if let Some(last) = fragments.last_mut() {
                *last = format!("{last} {epilogue}");
            }
        }
        Ok(fragments)
    }

    /// Returns whether any generator supports the statement on the dialect.
    #[must_use]
    pub fn supports_statement(&self, statement: &Statement, dialect: &Dialect) -> bool {
        self.candidates(statement.kind())
            .any(|g| g.supports(statement, dialect))
    }

    /// Validates with the highest-priority supporting generator.
    ///
    /// Returns no errors when nothing supports the statement.
    #[must_use]
    pub fn validate_statement(&self, statement: &Statement, dialect: &Dialect) -> ValidationErrors {
        self.candidates(statement.kind())
            .find(|g| g.supports(statement, dialect))
            .map(|g| g.validate(statement, dialect))
            .unwrap_or_default()
    }

    /// Returns the number of registered generators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{postgres, sqlite};
    use crate::error::RenderError;
    use crate::statement::{CreateSequence, DropTable, TableRef};

    struct Fixed {
        name: &'static str,
        priority: i32,
        valid: bool,
    }

    impl Generator for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn kind(&self) -> StatementKind {
            StatementKind::DropTable
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn validate(&self, _statement: &Statement, _dialect: &Dialect) -> ValidationErrors {
            let mut errors = ValidationErrors::new();
            if !self.valid {
                errors.add(self.name, "rejected");
            }
            errors
        }

        fn generate(
            &self,
            _statement: &Statement,
            _dialect: &Dialect,
        ) -> Result<Vec<Sql>, RenderError> {
            Ok(vec![format!("-- {}", self.name)])
        }
    }

    fn drop_table() -> Statement {
        DropTable {
            table: TableRef::new("t"),
            cascade: false,
            if_exists: false,
        }
        .into()
    }

    #[test]
    fn test_highest_priority_wins() {
        let mut registry = GeneratorRegistry::new();
        registry.register(Fixed { name: "five", priority: 5, valid: true });
        registry.register(Fixed { name: "ten", priority: 10, valid: true });
        registry.register(Fixed { name: "one", priority: 1, valid: true });

        let chosen = registry.resolve(&drop_table(), &sqlite()).unwrap();
        assert_eq!(chosen.name(), "ten");
    }

    #[test]
    fn test_tie_goes_to_first_registered() {
        let mut registry = GeneratorRegistry::new();
        registry.register(Fixed { name: "first", priority: 5, valid: true });
        registry.register(Fixed { name: "second", priority: 5, valid: true });

        for _ in 0..3 {
            let chosen = registry.resolve(&drop_table(), &sqlite()).unwrap();
            assert_eq!(chosen.name(), "first");
        }
    }

    #[test]
    fn test_invalid_falls_through_to_next() {
        let mut registry = GeneratorRegistry::new();
        registry.register(Fixed { name: "strict", priority: 10, valid: false });
        registry.register(Fixed { name: "lenient", priority: 1, valid: true });

        let chosen = registry.resolve(&drop_table(), &sqlite()).unwrap();
        assert_eq!(chosen.name(), "lenient");
    }

    #[test]
    fn test_invalid_when_none_validates() {
        let mut registry = GeneratorRegistry::new();
        registry.register(Fixed { name: "low", priority: 1, valid: false });
        registry.register(Fixed { name: "high", priority: 10, valid: false });

        match registry.resolve(&drop_table(), &sqlite()) {
            Err(ResolveError::Invalid { errors, .. }) => {
                assert!(errors.has_error_for("high"));
                assert!(!errors.has_error_for("low"));
            }
            other => panic!("expected Invalid, got {:?}", other.map(|g| g.name())),
        }
    }

    #[test]
    fn test_unsupported() {
        let registry = GeneratorRegistry::standard();
        let statement: Statement = CreateSequence {
            sequence: TableRef::new("s"),
            start: None,
            increment: None,
        }
        .into();
        let err = registry.generate_sql(&statement, &sqlite()).unwrap_err();
        assert!(err.is_unsupported());
        assert!(!registry.supports_statement(&statement, &sqlite()));
        assert!(registry.supports_statement(&statement, &postgres()));
    }

    #[test]
    fn test_prologue_and_epilogue() {
        let registry = GeneratorRegistry::standard();
        let statement = drop_table()
            .with_prologue("-- begin")
            .with_epilogue("-- end");
        let sql = registry.generate_sql(&statement, &sqlite()).unwrap();
        assert_eq!(sql, vec!["-- begin DROP TABLE \"t\" -- end".to_string()]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let registry = GeneratorRegistry::standard();
        let first = registry.generate_sql(&drop_table(), &postgres()).unwrap();
        let second = registry.generate_sql(&drop_table(), &postgres()).unwrap();
        assert_eq!(first, second);
    }
}
