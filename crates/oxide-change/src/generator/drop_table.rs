//! `DROP TABLE` rendering.

use super::common::check_table;
use super::{Generator, Sql};
use crate::dialect::Dialect;
use crate::error::{RenderError, ValidationErrors};
use crate::statement::{Statement, StatementBody, StatementKind};

/// Renders table removal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropTableGenerator;

impl Generator for DropTableGenerator {
    fn name(&self) -> &'static str {
        "dropTable"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropTable
    }

    fn validate(&self, statement: &Statement, dialect: &Dialect) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let StatementBody::DropTable(drop) = statement.body() else {
            errors.add("statement", format!("expected dropTable, got {}", statement.kind()));
            return errors;
        };
        check_table(&mut errors, "tableName", &drop.table);
        if drop.cascade && !dialect.capabilities().drop_table_cascade {
            errors.add(
                "cascadeConstraints",
                format!("cascade is not supported on {dialect}"),
            );
        }
        errors
    }

    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        let StatementBody::DropTable(drop) = statement.body() else {
            return Err(RenderError::wrong_kind(
                StatementKind::DropTable,
                statement.kind(),
            ));
        };

        let mut sql = String::from("DROP TABLE ");
        if drop.if_exists {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&drop.table.escaped(dialect));
        if drop.cascade {
            sql.push_str(" CASCADE");
        }
        Ok(vec![sql])
    }
}
