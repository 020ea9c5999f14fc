//! Literal `INSERT` rendering.

use super::common::{check_sequence_value, check_table, render_value};
use super::{Generator, Sql};
use crate::dialect::Dialect;
use crate::error::{RenderError, ValidationErrors};
use crate::statement::{Statement, StatementKind};

/// Renders [`Insert`](crate::statement::Insert) statements with inline values.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertGenerator;

impl Generator for InsertGenerator {
    fn name(&self) -> &'static str {
        "insert"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn validate(&self, statement: &Statement, dialect: &Dialect) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let Some(insert) = statement.as_insert() else {
            errors.add("statement", format!("expected insert, got {}", statement.kind()));
            return errors;
        };

        check_table(&mut errors, "tableName", &insert.table);
        errors.check_required_list("columns", &insert.values);
        for (index, (column, value)) in insert.values.iter().enumerate() {
            errors.check_required(&format!("columns[{index}].name"), Some(column));
            let field = format!("columns[{index}].value");
            if value.is_large_object_file() {
                errors.add(&field, "large object files require a prepared insert");
            }
            check_sequence_value(&mut errors, &field, value, dialect);
        }
        errors
    }

    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        let insert = statement
            .as_insert()
            .ok_or_else(|| RenderError::wrong_kind(StatementKind::Insert, statement.kind()))?;

        let columns = insert
            .values
            .iter()
            .map(|(name, _)| dialect.quote_identifier(name))
            .collect::<Vec<_>>()
            .join(", ");
        let values = insert
            .values
            .iter()
            .map(|(_, value)| render_value(value, dialect))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        Ok(vec![format!(
            "INSERT INTO {} ({columns}) VALUES ({values})",
            insert.table.escaped(dialect)
        )])
    }
}
