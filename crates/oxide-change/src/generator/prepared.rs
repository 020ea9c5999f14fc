//! Parameterized `INSERT` rendering for the streaming path.

use super::common::{check_sequence_value, check_table, render_value};
use super::{Generator, Sql};
use crate::dialect::Dialect;
use crate::error::{RenderError, ValidationErrors};
use crate::statement::{is_parameter, Statement, StatementKind};

/// Renders [`PreparedInsert`](crate::statement::PreparedInsert) statements.
///
/// Bindable values become dialect placeholders; computed expressions,
/// timestamps and sequence functions stay inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreparedInsertGenerator;

impl Generator for PreparedInsertGenerator {
    fn name(&self) -> &'static str {
        "preparedInsert"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::PreparedInsert
    }

    fn supports(&self, _statement: &Statement, dialect: &Dialect) -> bool {
        dialect.capabilities().large_object_streaming
    }

    fn validate(&self, statement: &Statement, dialect: &Dialect) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let Some(insert) = statement.as_prepared_insert() else {
            errors.add("statement", format!("expected preparedInsert, got {}", statement.kind()));
            return errors;
        };

        check_table(&mut errors, "tableName", &insert.table);
        errors.check_required_list("columns", &insert.columns);
        for (index, column) in insert.columns.iter().enumerate() {
            errors.check_required(&format!("columns[{index}].name"), Some(&column.name));
            if let Some(value) = &column.value {
                check_sequence_value(&mut errors, &format!("columns[{index}].value"), value, dialect);
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        let insert = statement.as_prepared_insert().ok_or_else(|| {
            RenderError::wrong_kind(StatementKind::PreparedInsert, statement.kind())
        })?;

        let mut names = Vec::with_capacity(insert.columns.len());
        let mut values = Vec::with_capacity(insert.columns.len());
        let mut index = 0;
        for column in &insert.columns {
            names.push(dialect.quote_identifier(&column.name));
            let value = column.value.as_ref();
            if is_parameter(value) {
                index += 1;
                values.push(dialect.placeholder(index));
            } else if let Some(value) = value {
                values.push(render_value(value, dialect)?);
            }
        }

        Ok(vec![format!(
            "INSERT INTO {} ({}) VALUES ({})",
            insert.table.escaped(dialect),
            names.join(", "),
            values.join(", ")
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnConfig;
    use crate::dialect::{postgres, sqlite, Dialect};
    use crate::statement::{PreparedInsert, TableRef};
    use crate::value::ColumnValue;

    fn statement() -> Statement {
        PreparedInsert {
            table: TableRef::new("docs"),
            columns: vec![
                ColumnConfig::new("id").with_value(ColumnValue::Integer(7)),
                ColumnConfig::new("body")
                    .with_type("CLOB")
                    .with_value(ColumnValue::String("text".into())),
                ColumnConfig::new("created").with_value(ColumnValue::CurrentTimestamp),
                ColumnConfig::new("image").with_value(ColumnValue::BlobFile("a.png".into())),
            ],
        }
        .into()
    }

    #[test]
    fn test_placeholders_per_dialect() {
        let sql = PreparedInsertGenerator.generate(&statement(), &sqlite()).unwrap();
        assert_eq!(
            sql[0],
            "INSERT INTO \"docs\" (\"id\", \"body\", \"created\", \"image\") VALUES (?, ?, CURRENT_TIMESTAMP, ?)"
        );

        let sql = PreparedInsertGenerator.generate(&statement(), &postgres()).unwrap();
        assert_eq!(
            sql[0],
            "INSERT INTO \"docs\" (\"id\", \"body\", \"created\", \"image\") VALUES ($1, $2, NOW(), $3)"
        );
    }

    #[test]
    fn test_requires_streaming_capability() {
        let plain = Dialect::builder("plain").build();
        assert!(!PreparedInsertGenerator.supports(&statement(), &plain));
        assert!(PreparedInsertGenerator.supports(&statement(), &sqlite()));
    }
}
