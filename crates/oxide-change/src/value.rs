//! Column values and value-producing functions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A reference to a database sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRef {
    /// Schema holding the sequence, if qualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Sequence name.
    pub name: String,
}

impl SequenceRef {
    /// Creates an unqualified sequence reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Qualifies the reference with a schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

/// The value a column receives, or the function producing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ColumnValue {
    /// SQL NULL.
    Null,
    /// Boolean literal, rendered with the dialect's boolean tokens.
    Boolean(bool),
    /// Integer literal.
    Integer(i64),
    /// Numeric literal kept as text so it round-trips exactly.
    Numeric(String),
    /// String literal.
    String(String),
    /// Date literal (`YYYY-MM-DD`).
    Date(String),
    /// Date-time literal (`YYYY-MM-DD HH:MM:SS`).
    DateTime(String),
    /// Expression computed by the database (`UPPER('a')`, `some_fn()`).
    Computed(String),
    /// The dialect's current timestamp expression.
    CurrentTimestamp,
    /// Next value of a sequence.
    SequenceNext(SequenceRef),
    /// Current value of a sequence.
    SequenceCurrent(SequenceRef),
    /// Binary content streamed from a file.
    BlobFile(PathBuf),
    /// Character content streamed from a file.
    ClobFile(PathBuf),
}

impl ColumnValue {
    /// Returns true if the value references an external large-object file.
    #[must_use]
    pub fn is_large_object_file(&self) -> bool {
        matches!(self, Self::BlobFile(_) | Self::ClobFile(_))
    }

    /// Returns true if the value can be sent as a bound parameter on the
    /// prepared path. Everything else is inlined as an expression.
    #[must_use]
    pub fn is_bindable(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::Boolean(_)
                | Self::Integer(_)
                | Self::Numeric(_)
                | Self::String(_)
                | Self::Date(_)
                | Self::DateTime(_)
                | Self::BlobFile(_)
                | Self::ClobFile(_)
        )
    }

    /// Binds sequence references to the given schema scope.
    pub fn bind_sequence_schema(&mut self, schema: Option<&str>) {
        if let Self::SequenceNext(seq) | Self::SequenceCurrent(seq) = self {
            seq.schema = schema.map(str::to_string);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_sequence_schema() {
        let mut value = ColumnValue::SequenceNext(SequenceRef::new("user_seq"));
        value.bind_sequence_schema(Some("app"));
        assert_eq!(
            value,
            ColumnValue::SequenceNext(SequenceRef::new("user_seq").in_schema("app"))
        );

        let mut literal = ColumnValue::Integer(4);
        literal.bind_sequence_schema(Some("app"));
        assert_eq!(literal, ColumnValue::Integer(4));
    }

    #[test]
    fn test_bindable() {
        assert!(ColumnValue::String("a".into()).is_bindable());
        assert!(ColumnValue::ClobFile("notes.txt".into()).is_bindable());
        assert!(!ColumnValue::CurrentTimestamp.is_bindable());
        assert!(!ColumnValue::Computed("NOW()".into()).is_bindable());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&ColumnValue::Integer(1)).unwrap();
        assert_eq!(json, r#"{"kind":"integer","value":1}"#);
        let back: ColumnValue = serde_json::from_str(r#"{"kind":"null"}"#).unwrap();
        assert_eq!(back, ColumnValue::Null);
    }
}
