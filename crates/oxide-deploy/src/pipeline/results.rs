//! Typed results threaded between pipeline steps.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::error::PipelineError;

/// The name and Rust type of a pipeline result, as declared by steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultType {
    /// Result name.
    pub name: &'static str,
    /// Type stored under the name.
    pub type_name: &'static str,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.type_name)
    }
}

/// A typed handle to a named result.
pub struct ResultKey<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> ResultKey<T> {
    /// Declares a key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    /// Returns the result name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared name and type.
    #[must_use]
    pub fn result_type(&self) -> ResultType {
        ResultType {
            name: self.name,
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl<T> Clone for ResultKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ResultKey<T> {}

impl<T> fmt::Debug for ResultKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResultKey").field(&self.name).finish()
    }
}

/// Results produced so far in a pipeline run.
#[derive(Default)]
pub struct PipelineResults {
    values: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for PipelineResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("PipelineResults").field("names", &names).finish()
    }
}

impl PipelineResults {
    /// Creates an empty result set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateResult`] if the name is taken.
    pub fn add<T: Any + Send + Sync>(&mut self, key: ResultKey<T>, value: T) -> Result<(), PipelineError> {
        if self.values.contains_key(key.name) {
            return Err(PipelineError::DuplicateResult(key.name));
        }
        self.values.insert(key.name, Box::new(value));
        Ok(())
    }

    /// Adds a result, replacing any previous value.
    pub fn overwrite<T: Any + Send + Sync>(&mut self, key: ResultKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    /// Adds a result and returns the set, for seeding a run.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, key: ResultKey<T>, value: T) -> Self {
        self.overwrite(key, value);
        self
    }

    /// Returns a result if present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ResultType`] if the stored value has
    /// another type.
    pub fn get<T: Any>(&self, key: ResultKey<T>) -> Result<Option<&T>, PipelineError> {
        self.values
            .get(key.name)
            .map(|value| {
                value.downcast_ref::<T>().ok_or(PipelineError::ResultType {
                    name: key.name,
                    expected: std::any::type_name::<T>(),
                })
            })
            .transpose()
    }

    /// Returns a result that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingResult`] if absent, or
    /// [`PipelineError::ResultType`] for a value of another type.
    pub fn require<T: Any>(&self, key: ResultKey<T>) -> Result<&T, PipelineError> {
        self.get(key)?.ok_or(PipelineError::MissingResult(key.name))
    }

    /// Removes and returns a result.
    pub fn take<T: Any>(&mut self, key: ResultKey<T>) -> Option<T> {
        let value = self.values.remove(key.name)?;
        value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Returns true if a result with that name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: ResultKey<u32> = ResultKey::new("count");
    const LABEL: ResultKey<String> = ResultKey::new("count");

    #[test]
    fn test_add_and_require() {
        let mut results = PipelineResults::new();
        assert!(matches!(results.require(COUNT), Err(PipelineError::MissingResult("count"))));

        results.add(COUNT, 3).unwrap();
        assert_eq!(*results.require(COUNT).unwrap(), 3);
        assert!(results.contains("count"));
        assert!(matches!(results.add(COUNT, 4), Err(PipelineError::DuplicateResult("count"))));

        results.overwrite(COUNT, 4);
        assert_eq!(results.get(COUNT).unwrap(), Some(&4));
    }

    #[test]
    fn test_type_mismatch() {
        let results = PipelineResults::new().with(COUNT, 1);
        assert!(matches!(results.get(LABEL), Err(PipelineError::ResultType { name: "count", .. })));
    }

    #[test]
    fn test_take() {
        let mut results = PipelineResults::new().with(LABEL, "x".to_string());
        assert_eq!(results.take(LABEL).as_deref(), Some("x"));
        assert!(results.is_empty());
    }

    #[test]
    fn test_result_type() {
        assert_eq!(COUNT.result_type().type_name, "u32");
        assert_eq!(COUNT.result_type().to_string(), "count (u32)");
    }
}
