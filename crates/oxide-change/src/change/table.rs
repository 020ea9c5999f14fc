//! Table creation and removal changes.

use serde::{Deserialize, Serialize};

use crate::column::ColumnConfig;
use crate::error::ValidationErrors;
use crate::statement::{ColumnDefinition, CreateTable, DropTable, Statement, TableRef};
use crate::types::DataType;

/// Creates a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableChange {
    /// Catalog of the new table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    /// Schema of the new table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Table name.
    #[serde(default)]
    pub table_name: String,
    /// Columns; a column value becomes its default.
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    /// DBMS filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbms: Option<String>,
}

impl CreateTableChange {
    /// Creates a table change with no columns.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnConfig) -> Self {
        self.columns.push(column);
        self
    }

    /// Checks required fields. Every column needs a type.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check_required("tableName", Some(&self.table_name));
        errors.check_required_list("columns", &self.columns);
        for (index, column) in self.columns.iter().enumerate() {
            errors.check_required(&format!("columns[{index}].name"), Some(&column.name));
            errors.check_required(
                &format!("columns[{index}].type"),
                column.declared_type.as_deref(),
            );
        }
        errors
    }

    pub(crate) fn statements(&self) -> Vec<Statement> {
        let columns = self
            .columns
            .iter()
            .map(|column| ColumnDefinition {
                name: column.name.clone(),
                data_type: column
                    .data_type()
                    .unwrap_or_else(|| DataType::Custom(String::new())),
                primary_key: column.primary_key,
                nullable: column.nullable && !column.primary_key,
                auto_increment: column.is_auto_increment(),
                default: column.value.clone(),
            })
            .collect();

        vec![CreateTable {
            table: table_ref(&self.catalog_name, &self.schema_name, &self.table_name),
            columns,
        }
        .into()]
    }
}

/// Drops a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTableChange {
    /// Catalog of the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    /// Schema of the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Table name.
    #[serde(default)]
    pub table_name: String,
    /// Also drop constraints referencing the table.
    #[serde(default)]
    pub cascade_constraints: bool,
    /// Tolerate a missing table.
    #[serde(default)]
    pub if_exists: bool,
    /// DBMS filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbms: Option<String>,
}

impl DropTableChange {
    /// Creates a drop of an unqualified table.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Checks required fields.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check_required("tableName", Some(&self.table_name));
        errors
    }

    pub(crate) fn statements(&self) -> Vec<Statement> {
        vec![DropTable {
            table: table_ref(&self.catalog_name, &self.schema_name, &self.table_name),
            cascade: self.cascade_constraints,
            if_exists: self.if_exists,
        }
        .into()]
    }
}

pub(crate) fn table_ref(catalog: &Option<String>, schema: &Option<String>, name: &str) -> TableRef {
    TableRef {
        catalog: catalog.clone(),
        schema: schema.clone(),
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::StatementBody;

    #[test]
    fn test_create_table_requires_types() {
        let change = CreateTableChange::new("users")
            .column(ColumnConfig::new("id").with_type("int"))
            .column(ColumnConfig::new("name"));
        let errors = change.validate();
        assert!(errors.has_error_for("columns[1].type"));
        assert!(!errors.has_error_for("columns[0].type"));
    }

    #[test]
    fn test_create_table_statement() {
        let change = CreateTableChange::new("users")
            .column(ColumnConfig::new("id").with_type("bigint").primary_key().auto_increment())
            .column(ColumnConfig::new("email").with_type("varchar(120)").not_null());
        let statements = change.statements();
        let StatementBody::CreateTable(table) = statements[0].body() else {
            panic!("expected createTable");
        };
        assert_eq!(table.columns[0].data_type, DataType::BigInt);
        assert!(table.columns[0].auto_increment);
        assert!(!table.columns[0].nullable);
        assert!(!table.columns[1].nullable);
        assert!(!table.columns[1].primary_key);
    }
}
