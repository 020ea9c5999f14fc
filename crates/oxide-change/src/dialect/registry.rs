//! Registry of target dialects, keyed by name and searchable by URL.

use std::sync::Arc;

use super::{informix, mssql, mysql, postgres, sqlite, Dialect};
use crate::error::DialectError;

/// The set of dialects known to a [`ChangeContext`](crate::ChangeContext).
///
/// Registration order is preserved; URL lookup returns the first dialect
/// whose schemes match.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: Vec<Arc<Dialect>>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in dialect.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            dialects: vec![
                Arc::new(sqlite()),
                Arc::new(postgres()),
                Arc::new(mysql()),
                Arc::new(mssql()),
                Arc::new(informix()),
            ],
        }
    }

    /// Registers a dialect. Names must be unique.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Duplicate`] if the name is taken.
    pub fn register(&mut self, dialect: Dialect) -> Result<Arc<Dialect>, DialectError> {
        if self.get(dialect.name()).is_some() {
            return Err(DialectError::Duplicate(dialect.name().to_string()));
        }
        let dialect = Arc::new(dialect);
        self.dialects.push(Arc::clone(&dialect));
        Ok(dialect)
    }

    /// Looks up a dialect by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Dialect>> {
        self.dialects
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Looks up a dialect by name, failing if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unknown`] if no dialect has that name.
    pub fn require(&self, name: &str) -> Result<Arc<Dialect>, DialectError> {
        self.get(name)
            .ok_or_else(|| DialectError::Unknown(name.to_string()))
    }

    /// Finds the dialect answering to a connection URL.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::UnknownUrl`] if no scheme matches.
    pub fn for_url(&self, url: &str) -> Result<Arc<Dialect>, DialectError> {
        self.dialects
            .iter()
            .find(|d| d.matches_url(url))
            .cloned()
            .ok_or_else(|| DialectError::UnknownUrl(url.to_string()))
    }

    /// Iterates over registered dialects in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Dialect>> {
        self.dialects.iter()
    }

    /// Returns the number of registered dialects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dialects.len()
    }

    /// Returns true if no dialect is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dialects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = DialectRegistry::standard();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.require("sqlite").unwrap().name(), "sqlite");
        assert!(matches!(
            registry.require("oracle"),
            Err(DialectError::Unknown(_))
        ));
    }

    #[test]
    fn test_for_url() {
        let registry = DialectRegistry::standard();
        assert_eq!(registry.for_url("sqlite::memory:").unwrap().name(), "sqlite");
        assert_eq!(
            registry.for_url("postgresql://localhost/app").unwrap().name(),
            "postgresql"
        );
        assert_eq!(
            registry.for_url("jdbc:sqlserver://host;db=x").unwrap().name(),
            "mssql"
        );
        assert!(matches!(
            registry.for_url("oracle:thin:@host"),
            Err(DialectError::UnknownUrl(_))
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = DialectRegistry::standard();
        let err = registry
            .register(Dialect::builder("sqlite").build())
            .unwrap_err();
        assert_eq!(err, DialectError::Duplicate("sqlite".into()));

        registry.register(Dialect::builder("h2").build()).unwrap();
        assert_eq!(registry.len(), 6);
    }
}
