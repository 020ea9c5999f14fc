//! Sequence creation and removal. Only offered where the dialect has sequences.

use super::common::check_table;
use super::{Generator, Sql};
use crate::dialect::Dialect;
use crate::error::{RenderError, ValidationErrors};
use crate::statement::{Statement, StatementBody, StatementKind};

/// Renders `CREATE SEQUENCE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateSequenceGenerator;

impl Generator for CreateSequenceGenerator {
    fn name(&self) -> &'static str {
        "createSequence"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateSequence
    }

    fn supports(&self, _statement: &Statement, dialect: &Dialect) -> bool {
        dialect.capabilities().sequences
    }

    fn validate(&self, statement: &Statement, _dialect: &Dialect) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match statement.body() {
            StatementBody::CreateSequence(create) => {
                check_table(&mut errors, "sequenceName", &create.sequence);
                if create.increment == Some(0) {
                    errors.add("incrementBy", "must not be zero");
                }
            }
            _ => errors.add(
                "statement",
                format!("expected createSequence, got {}", statement.kind()),
            ),
        }
        errors
    }

    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        let StatementBody::CreateSequence(create) = statement.body() else {
            return Err(RenderError::wrong_kind(
                StatementKind::CreateSequence,
                statement.kind(),
            ));
        };

        let mut sql = format!("CREATE SEQUENCE {}", create.sequence.escaped(dialect));
        if let Some(start) = create.start {
            sql.push_str(&format!(" START WITH {start}"));
        }
        if let Some(increment) = create.increment {
            sql.push_str(&format!(" INCREMENT BY {increment}"));
        }
        Ok(vec![sql])
    }
}

/// Renders `DROP SEQUENCE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropSequenceGenerator;

impl Generator for DropSequenceGenerator {
    fn name(&self) -> &'static str {
        "dropSequence"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropSequence
    }

    fn supports(&self, _statement: &Statement, dialect: &Dialect) -> bool {
        dialect.capabilities().sequences
    }

    fn validate(&self, statement: &Statement, _dialect: &Dialect) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        match statement.body() {
            StatementBody::DropSequence(drop) => {
                check_table(&mut errors, "sequenceName", &drop.sequence);
            }
            _ => errors.add(
                "statement",
                format!("expected dropSequence, got {}", statement.kind()),
            ),
        }
        errors
    }

    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        let StatementBody::DropSequence(drop) = statement.body() else {
            return Err(RenderError::wrong_kind(
                StatementKind::DropSequence,
                statement.kind(),
            ));
        };
        Ok(vec![format!("DROP SEQUENCE {}", drop.sequence.escaped(dialect))])
    }
}
