//! The insert-data change.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ColumnSnapshot;
use crate::column::ColumnConfig;
use crate::dialect::Dialect;
use crate::error::ValidationErrors;
use crate::statement::{Insert, PreparedInsert, Statement, StatementOptions, TableRef};
use crate::value::ColumnValue;

/// Inserts one row into a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertDataChange {
    /// Catalog of the target table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    /// Schema of the target table. Also the scope sequence references bind to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Target table.
    #[serde(default)]
    pub table_name: String,
    /// Columns in declared order.
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    /// Statement prologue; a column prologue replaces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prologue: Option<String>,
    /// Statement epilogue; a column epilogue replaces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilogue: Option<String>,
    /// DBMS filter (`"postgresql, mysql"`, `"!sqlite"`, `"all"`, `"none"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbms: Option<String>,
}

/// The column set left after applying dialect rules to an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedInsert {
    pub columns: Vec<ColumnConfig>,
    pub prologue: Option<String>,
    pub epilogue: Option<String>,
}

impl InsertDataChange {
    /// Creates an insert into an unqualified table.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnConfig) -> Self {
        self.columns.push(column);
        self
    }

    /// Checks required fields.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check_required("tableName", Some(&self.table_name));
        errors.check_required_list("columns", &self.columns);
        errors
    }

    /// Returns the escaped-later reference to the target table.
    #[must_use]
    pub fn table(&self) -> TableRef {
        TableRef {
            catalog: self.catalog_name.clone(),
            schema: self.schema_name.clone(),
            name: self.table_name.clone(),
        }
    }

    /// Returns whether the insert must go through the prepared path.
    ///
    /// Large-object file values and `BLOB`/`CLOB` declared types always
    /// force it. On dialects that cannot target existing large-object
    /// columns with literals, the live column type is also consulted for
    /// every column that carries a value.
    pub fn needs_prepared_statement(&self, dialect: &Dialect, snapshot: &dyn ColumnSnapshot) -> bool {
        let table = self.table();
        self.columns.iter().any(|column| {
            if column.value.as_ref().is_some_and(|v| v.is_large_object_file())
                || column.declares_large_object()
            {
                return true;
            }
            dialect.capabilities().introspects_large_objects
                && column.value.is_some()
                && snapshot
                    .column_type(&table, &column.name)
                    .is_some_and(|t| t.is_large_object())
        })
    }

    /// Applies the per-column rules in declared order.
    ///
    /// A column prologue or epilogue overwrites the current one before the
    /// skip check runs. Auto-increment columns are dropped when the database
    /// generates them, and sequence references bind to this change's schema.
    pub(crate) fn normalize(&self, dialect: &Dialect) -> NormalizedInsert {
        let mut prologue = self.prologue.clone();
        let mut epilogue = self.epilogue.clone();
        let mut columns = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            if column.prologue.is_some() {
                prologue.clone_from(&column.prologue);
            }
            if column.epilogue.is_some() {
                epilogue.clone_from(&column.epilogue);
            }
            if dialect.supports_auto_increment() && column.is_auto_increment() {
                debug!(column = %column.name, dialect = dialect.name(), "Skipping auto-increment column");
                continue;
            }
            let mut column = column.clone();
            if let Some(value) = column.value.as_mut() {
                value.bind_sequence_schema(self.schema_name.as_deref());
            }
            columns.push(column);
        }

        NormalizedInsert {
            columns,
            prologue,
            epilogue,
        }
    }

    /// Builds the statement for this change.
    pub(crate) fn statements(&self, dialect: &Dialect, snapshot: &dyn ColumnSnapshot) -> Vec<Statement> {
        if self.needs_prepared_statement(dialect, snapshot) {
            debug!(table = %self.table_name, dialect = dialect.name(), "Using prepared insert");
            return vec![PreparedInsert {
                table: self.table(),
                columns: self.columns.clone(),
            }
            .into()];
        }

        let normalized = self.normalize(dialect);
        let insert = Insert {
            table: self.table(),
            values: normalized
                .columns
                .into_iter()
                .map(|c| (c.name, c.value.unwrap_or(ColumnValue::Null)))
                .collect(),
        };
        let statement = Statement::from(insert).with_options(StatementOptions {
            prologue: normalized.prologue,
            epilogue: normalized.epilogue,
            ..StatementOptions::default()
        });
        vec![statement]
    }
}
