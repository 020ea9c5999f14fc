//! Error types for SQL generation.

use std::fmt;

use crate::statement::StatementKind;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field (`tableName`, `columns[2].type`, ...).
    pub field: String,
    /// Human readable message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation errors collected across a whole check.
///
/// Collecting never aborts: every check runs and callers inspect the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Records `"<field> is required"` when the value is missing or blank.
    pub fn check_required(&mut self, field: &str, value: Option<&str>) {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.add(field, "is required");
        }
    }

    /// Records `"<field> is required"` when the slice is empty.
    pub fn check_required_list<T>(&mut self, field: &str, values: &[T]) {
        if values.is_empty() {
            self.add(field, "is required");
        }
    }

    /// Merges another collection into this one.
    pub fn extend(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Returns true if any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the recorded errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns true if any error concerns the given field.
    #[must_use]
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// A generator could not render a statement it accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RenderError {
    /// What went wrong.
    pub message: String,
}

impl RenderError {
    /// Creates a render error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The generator was handed a statement of another kind.
    #[must_use]
    pub fn wrong_kind(expected: StatementKind, actual: StatementKind) -> Self {
        Self::new(format!("expected a {expected} statement, got {actual}"))
    }
}

/// Why a statement could not be turned into SQL for a dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No registered generator applies to this statement on this dialect.
    ///
    /// Usually not a failure: callers decide whether to skip.
    #[error("{kind} is not supported on {dialect}")]
    Unsupported {
        /// Statement kind.
        kind: StatementKind,
        /// Dialect name.
        dialect: String,
    },

    /// A generator applies but the statement is malformed for it.
    #[error("invalid {kind} statement for {dialect}: {errors}")]
    Invalid {
        /// Statement kind.
        kind: StatementKind,
        /// Dialect name.
        dialect: String,
        /// Field errors reported by the generator.
        errors: ValidationErrors,
    },

    /// The selected generator failed while rendering.
    #[error("failed to render {kind} for {dialect}: {source}")]
    Render {
        /// Statement kind.
        kind: StatementKind,
        /// Dialect name.
        dialect: String,
        /// The render failure.
        #[source]
        source: RenderError,
    },
}

impl ResolveError {
    /// Returns true for the "not applicable" case.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// A change could not be compiled into statements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeError {
    /// Required fields are absent; detected before any dialect-specific step.
    #[error("invalid {change} change: {errors}")]
    Configuration {
        /// Change name (`insert`, `createTable`, ...).
        change: &'static str,
        /// Missing or malformed fields.
        errors: ValidationErrors,
    },
}

/// Dialect registration and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialectError {
    /// A dialect with the same name is already registered.
    #[error("dialect '{0}' is already registered")]
    Duplicate(String),

    /// No dialect with that name.
    #[error("unknown dialect '{0}'")]
    Unknown(String),

    /// No dialect answers to the connection URL.
    #[error("no registered dialect handles connection URL '{0}'")]
    UnknownUrl(String),
}

/// Checksum computation and comparison failures.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// The stored value is not a `<version>:<hex>` checksum.
    #[error("malformed checksum '{0}'")]
    Malformed(String),

    /// The recorded checksum differs from the current definition.
    #[error("checksum mismatch for '{id}': ledger has {stored}, current definition is {computed}")]
    Mismatch {
        /// Change set identity.
        id: String,
        /// Checksum stored in the ledger.
        stored: String,
        /// Checksum of the current definition.
        computed: String,
    },

    /// The change could not be serialized for hashing.
    #[error("failed to serialize change for checksum: {0}")]
    Serialization(#[from] serde_json::Error),
}
