//! `CREATE TABLE` rendering.

use super::common::{check_table, render_value};
use super::{Generator, Sql, PRIORITY_DATABASE};
use crate::dialect::Dialect;
use crate::error::{RenderError, ValidationErrors};
use crate::statement::{ColumnDefinition, CreateTable, Statement, StatementBody, StatementKind};

/// Renders table creation with the dialect's auto-increment clause and a
/// table-level primary key constraint.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateTableGenerator;

impl Generator for CreateTableGenerator {
    fn name(&self) -> &'static str {
        "createTable"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateTable
    }

    fn validate(&self, statement: &Statement, dialect: &Dialect) -> ValidationErrors {
        match create_table(statement) {
            Ok(table) => validate_common(table, dialect),
            Err(e) => wrong_statement(&e),
        }
    }

    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        let table = create_table(statement)?;
        Ok(vec![render(table, dialect, None)?])
    }
}

/// SQLite only accepts `AUTOINCREMENT` on an inline `INTEGER PRIMARY KEY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteCreateTableGenerator;

impl Generator for SqliteCreateTableGenerator {
    fn name(&self) -> &'static str {
        "sqliteCreateTable"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateTable
    }

    fn priority(&self) -> i32 {
        PRIORITY_DATABASE
    }

    fn supports(&self, _statement: &Statement, dialect: &Dialect) -> bool {
        dialect.name() == "sqlite"
    }

    fn validate(&self, statement: &Statement, dialect: &Dialect) -> ValidationErrors {
        let table = match create_table(statement) {
            Ok(table) => table,
            Err(e) => return wrong_statement(&e),
        };
        let mut errors = validate_common(table, dialect);

        let primary_keys = table.columns.iter().filter(|c| c.primary_key).count();
        for (index, column) in table.columns.iter().enumerate() {
            if column.auto_increment && !(column.primary_key && primary_keys == 1) {
                errors.add(
                    format!("columns[{index}].autoIncrement"),
                    "AUTOINCREMENT requires a single-column primary key",
                );
            }
        }
        errors
    }

    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError> {
        let table = create_table(statement)?;
        let inline = table.columns.iter().position(|c| c.auto_increment);
        Ok(vec![render(table, dialect, inline)?])
    }
}

fn create_table(statement: &Statement) -> Result<&CreateTable, RenderError> {
    match statement.body() {
        StatementBody::CreateTable(table) => Ok(table),
        _ => Err(RenderError::wrong_kind(
            StatementKind::CreateTable,
            statement.kind(),
        )),
    }
}

fn wrong_statement(error: &RenderError) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("statement", error.to_string());
    errors
}

fn validate_common(table: &CreateTable, dialect: &Dialect) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_table(&mut errors, "tableName", &table.table);
    errors.check_required_list("columns", &table.columns);
    for (index, column) in table.columns.iter().enumerate() {
        errors.check_required(&format!("columns[{index}].name"), Some(&column.name));
        if column.auto_increment && !dialect.supports_auto_increment() {
            errors.add(
                format!("columns[{index}].autoIncrement"),
                format!("auto-increment is not supported on {dialect}"),
            );
        }
    }
    errors
}

/// Renders the statement. The column at `inline_key` carries its primary
/// key inline and is left out of the table constraint.
fn render(
    table: &CreateTable,
    dialect: &Dialect,
    inline_key: Option<usize>,
) -> Result<String, RenderError> {
    let mut definitions = Vec::with_capacity(table.columns.len() + 1);
    for (index, column) in table.columns.iter().enumerate() {
        if inline_key == Some(index) {
            definitions.push(format!(
                "{} INTEGER PRIMARY KEY {}",
                dialect.quote_identifier(&column.name),
                dialect.auto_increment_clause()
            ));
        } else {
            definitions.push(column_definition(column, dialect)?);
        }
    }

    let keys = table
        .columns
        .iter()
        .enumerate()
        .filter(|(index, c)| c.primary_key && inline_key != Some(*index))
        .map(|(_, c)| dialect.quote_identifier(&c.name))
        .collect::<Vec<_>>();
    if !keys.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", keys.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE {} ({})",
        table.table.escaped(dialect),
        definitions.join(", ")
    ))
}

fn column_definition(column: &ColumnDefinition, dialect: &Dialect) -> Result<String, RenderError> {
    let mut parts = vec![
        dialect.quote_identifier(&column.name),
        dialect.type_token(&column.data_type),
    ];
    if column.auto_increment && !dialect.auto_increment_clause().is_empty() {
        parts.push(dialect.auto_increment_clause().to_string());
    }
    if !column.nullable {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &column.default {
        parts.push(format!("DEFAULT {}", render_value(default, dialect)?));
    }
    Ok(parts.join(" "))
}
