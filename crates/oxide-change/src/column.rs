//! Column specifications carried by changes.

use serde::{Deserialize, Serialize};

use crate::types::DataType;
use crate::value::ColumnValue;

/// A column as declared in a change: name, declared type, value and flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    /// Column name.
    pub name: String,
    /// Declared type as written by the author (`varchar(255)`, `CLOB`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    /// Value or value-producing function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ColumnValue>,
    /// Whether the database generates this column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    /// Free text placed before the rendered statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prologue: Option<String>,
    /// Free text placed after the rendered statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilogue: Option<String>,
    /// Part of the primary key (table definitions only).
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
    /// Whether NULL is allowed (table definitions only).
    #[serde(default = "default_nullable", skip_serializing_if = "is_true")]
    pub nullable: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}

fn default_nullable() -> bool {
    true
}

impl ColumnConfig {
    /// Creates a column with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            value: None,
            auto_increment: None,
            prologue: None,
            epilogue: None,
            primary_key: false,
            nullable: true,
        }
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    /// Sets the value.
    #[must_use]
    pub fn with_value(mut self, value: ColumnValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Flags the column as generated by the database.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = Some(true);
        self
    }

    /// Sets the column prologue.
    #[must_use]
    pub fn with_prologue(mut self, prologue: impl Into<String>) -> Self {
        self.prologue = Some(prologue.into());
        self
    }

    /// Sets the column epilogue.
    #[must_use]
    pub fn with_epilogue(mut self, epilogue: impl Into<String>) -> Self {
        self.epilogue = Some(epilogue.into());
        self
    }

    /// Marks the column as part of the primary key. Implies NOT NULL.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Returns true only if the column is explicitly flagged auto-increment.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment == Some(true)
    }

    /// Parses the declared type, if any.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        self.declared_type.as_deref().map(DataType::parse)
    }

    /// Returns true if the declared type is a large-object kind.
    #[must_use]
    pub fn declares_large_object(&self) -> bool {
        self.data_type().is_some_and(|t| t.is_large_object())
    }
}
