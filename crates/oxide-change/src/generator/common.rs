//! Rendering helpers shared by generators.

use crate::dialect::Dialect;
use crate::error::{RenderError, ValidationErrors};
use crate::statement::TableRef;
use crate::value::ColumnValue;

/// Renders a value as an inline SQL expression.
///
/// # Errors
///
/// Fails for sequence functions the dialect lacks and for large-object file
/// references, which only the prepared path can carry.
pub fn render_value(value: &ColumnValue, dialect: &Dialect) -> Result<String, RenderError> {
    match value {
        ColumnValue::Null => Ok("NULL".to_string()),
        ColumnValue::Boolean(b) => Ok(dialect.boolean_literal(*b).to_string()),
        ColumnValue::Integer(i) => Ok(i.to_string()),
        ColumnValue::Numeric(n) => Ok(n.clone()),
        ColumnValue::String(s) | ColumnValue::Date(s) | ColumnValue::DateTime(s) => {
            Ok(dialect.quote_string(s))
        }
        ColumnValue::Computed(expression) => Ok(expression.clone()),
        ColumnValue::CurrentTimestamp => Ok(dialect.current_timestamp().to_string()),
        ColumnValue::SequenceNext(seq) => dialect.sequence_next_value(seq).ok_or_else(|| {
            RenderError::new(format!(
                "{dialect} has no next-value function for sequence {}",
                seq.name
            ))
        }),
        ColumnValue::SequenceCurrent(seq) => {
            dialect.sequence_current_value(seq).ok_or_else(|| {
                RenderError::new(format!(
                    "{dialect} has no current-value function for sequence {}",
                    seq.name
                ))
            })
        }
        ColumnValue::BlobFile(path) | ColumnValue::ClobFile(path) => Err(RenderError::new(
            format!(
                "large object file {} cannot be rendered inline",
                path.display()
            ),
        )),
    }
}

/// Records an error if a value uses a sequence function the dialect lacks.
pub(crate) fn check_sequence_value(
    errors: &mut ValidationErrors,
    field: &str,
    value: &ColumnValue,
    dialect: &Dialect,
) {
    let missing = match value {
        ColumnValue::SequenceNext(seq) => dialect.sequence_next_value(seq).is_none(),
        ColumnValue::SequenceCurrent(seq) => dialect.sequence_current_value(seq).is_none(),
        _ => false,
    };
    if missing {
        errors.add(field, format!("sequence values are not supported on {dialect}"));
    }
}

/// Records `"<field> is required"` when the object name is blank.
pub(crate) fn check_table(errors: &mut ValidationErrors, field: &str, table: &TableRef) {
    errors.check_required(field, Some(&table.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{mssql, mysql, postgres, sqlite};
    use crate::value::SequenceRef;

    #[test]
    fn test_render_literals() {
        let d = postgres();
        assert_eq!(render_value(&ColumnValue::Null, &d).unwrap(), "NULL");
        assert_eq!(render_value(&ColumnValue::Boolean(true), &d).unwrap(), "TRUE");
        assert_eq!(render_value(&ColumnValue::Boolean(true), &sqlite()).unwrap(), "1");
        assert_eq!(render_value(&ColumnValue::Integer(-3), &d).unwrap(), "-3");
        assert_eq!(
            render_value(&ColumnValue::String("it's".into()), &d).unwrap(),
            "'it''s'"
        );
        assert_eq!(
            render_value(&ColumnValue::CurrentTimestamp, &mssql()).unwrap(),
            "GETDATE()"
        );
    }

    #[test]
    fn test_render_sequence_requires_support() {
        let seq = ColumnValue::SequenceNext(SequenceRef::new("s"));
        assert_eq!(render_value(&seq, &postgres()).unwrap(), "nextval('\"s\"')");
        assert!(render_value(&seq, &mysql()).is_err());

        let mut errors = ValidationErrors::new();
        check_sequence_value(&mut errors, "columns[0].value", &seq, &mysql());
        assert!(errors.has_error_for("columns[0].value"));
    }

    #[test]
    fn test_render_file_fails() {
        let blob = ColumnValue::BlobFile("img.png".into());
        assert!(render_value(&blob, &sqlite()).is_err());
    }
}
