//! Sequence creation change.

use serde::{Deserialize, Serialize};

use super::table::table_ref;
use crate::error::ValidationErrors;
use crate::statement::{CreateSequence, Statement};

/// Creates a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSequenceChange {
    /// Catalog of the sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    /// Schema of the sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Sequence name.
    #[serde(default)]
    pub sequence_name: String,
    /// First value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_value: Option<i64>,
    /// Step between values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_by: Option<i64>,
    /// DBMS filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbms: Option<String>,
}

impl CreateSequenceChange {
    /// Creates an unqualified sequence change.
    #[must_use]
    pub fn new(sequence_name: impl Into<String>) -> Self {
        Self {
            sequence_name: sequence_name.into(),
            ..Self::default()
        }
    }

    /// Checks required fields.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check_required("sequenceName", Some(&self.sequence_name));
        errors
    }

    pub(crate) fn statements(&self) -> Vec<Statement> {
        vec![CreateSequence {
            sequence: table_ref(&self.catalog_name, &self.schema_name, &self.sequence_name),
            start: self.start_value,
            increment: self.increment_by,
        }
        .into()]
    }
}
