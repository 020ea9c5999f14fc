//! Changes: user-declared units of work and their compilation.
//!
//! A [`Change`] compiles to one or more [`Statement`]s for a dialect.
//! Compilation is a pure function of the change, the dialect and, for
//! dialects that need it, a [`ColumnSnapshot`] of the live schema.

mod dbms;
mod insert;
mod sequence;
mod table;

pub use dbms::matches as dbms_matches;
pub use insert::InsertDataChange;
pub use sequence::CreateSequenceChange;
pub use table::{CreateTableChange, DropTableChange};

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{ChangeError, ValidationErrors};
use crate::statement::{Statement, TableRef};
use crate::types::DataType;

/// Reports the type of an existing database column.
///
/// Implemented by schema introspection; [`NoSnapshot`] knows nothing.
pub trait ColumnSnapshot {
    /// Returns the live type of `table.column`, if the column exists.
    fn column_type(&self, table: &TableRef, column: &str) -> Option<DataType>;
}

/// A snapshot with no columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnapshot;

impl ColumnSnapshot for NoSnapshot {
    fn column_type(&self, _table: &TableRef, _column: &str) -> Option<DataType> {
        None
    }
}

impl<F> ColumnSnapshot for F
where
    F: Fn(&TableRef, &str) -> Option<DataType>,
{
    fn column_type(&self, table: &TableRef, column: &str) -> Option<DataType> {
        self(table, column)
    }
}

/// A user-declared change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    /// Insert one row.
    InsertData(InsertDataChange),
    /// Create a table.
    CreateTable(CreateTableChange),
    /// Drop a table.
    DropTable(DropTableChange),
    /// Create a sequence.
    CreateSequence(CreateSequenceChange),
}

impl Change {
    /// Returns the change name used in messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertData(_) => "insertData",
            Self::CreateTable(_) => "createTable",
            Self::DropTable(_) => "dropTable",
            Self::CreateSequence(_) => "createSequence",
        }
    }

    /// Returns the DBMS filter, if any.
    #[must_use]
    pub fn dbms(&self) -> Option<&str> {
        match self {
            Self::InsertData(c) => c.dbms.as_deref(),
            Self::CreateTable(c) => c.dbms.as_deref(),
            Self::DropTable(c) => c.dbms.as_deref(),
            Self::CreateSequence(c) => c.dbms.as_deref(),
        }
    }

    /// Returns whether the DBMS filter admits the dialect.
    #[must_use]
    pub fn applies_to(&self, dialect: &Dialect) -> bool {
        dbms_matches(self.dbms(), dialect)
    }

    /// Checks the fields every dialect requires.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        match self {
            Self::InsertData(c) => c.validate(),
            Self::CreateTable(c) => c.validate(),
            Self::DropTable(c) => c.validate(),
            Self::CreateSequence(c) => c.validate(),
        }
    }

    /// Compiles the change without a live schema snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError::Configuration`] if required fields are missing.
    pub fn compile(&self, dialect: &Dialect) -> Result<Vec<Statement>, ChangeError> {
        self.compile_with(dialect, &NoSnapshot)
    }

    /// Compiles the change, consulting `snapshot` where the dialect needs it.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError::Configuration`] if required fields are missing.
    /// Validation happens before any dialect-specific rule is applied.
    pub fn compile_with(
        &self,
        dialect: &Dialect,
        snapshot: &dyn ColumnSnapshot,
    ) -> Result<Vec<Statement>, ChangeError> {
        let errors = self.validate();
        if errors.has_errors() {
            return Err(ChangeError::Configuration {
                change: self.name(),
                errors,
            });
        }

        Ok(match self {
            Self::InsertData(c) => c.statements(dialect, snapshot),
            Self::CreateTable(c) => c.statements(),
            Self::DropTable(c) => c.statements(),
            Self::CreateSequence(c) => c.statements(),
        })
    }

    /// Returns the message reported after the change is applied.
    #[must_use]
    pub fn confirmation_message(&self) -> String {
        match self {
            Self::InsertData(c) => format!("New row inserted into {}", c.table_name),
            Self::CreateTable(c) => format!("Table {} created", c.table_name),
            Self::DropTable(c) => format!("Table {} dropped", c.table_name),
            Self::CreateSequence(c) => format!("Sequence {} created", c.sequence_name),
        }
    }
}

impl From<InsertDataChange> for Change {
    fn from(change: InsertDataChange) -> Self {
        Self::InsertData(change)
    }
}

impl From<CreateTableChange> for Change {
    fn from(change: CreateTableChange) -> Self {
        Self::CreateTable(change)
    }
}

impl From<DropTableChange> for Change {
    fn from(change: DropTableChange) -> Self {
        Self::DropTable(change)
    }
}

impl From<CreateSequenceChange> for Change {
    fn from(change: CreateSequenceChange) -> Self {
        Self::CreateSequence(change)
    }
}

/// An identified, ordered group of changes; the unit recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    /// Identifier, unique together with author and filename.
    pub id: String,
    /// Author.
    pub author: String,
    /// Changelog the set was declared in.
    #[serde(default)]
    pub filename: String,
    /// Free text recorded in the ledger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Changes applied in order.
    #[serde(default)]
    pub changes: Vec<Change>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new(id: impl Into<String>, author: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            filename: filename.into(),
            comment: None,
            changes: Vec::new(),
        }
    }

    /// Appends a change.
    #[must_use]
    pub fn change(mut self, change: impl Into<Change>) -> Self {
        self.changes.push(change.into());
        self
    }

    /// Returns `filename::id::author`.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("{}::{}::{}", self.filename, self.id, self.author)
    }

    /// Returns a one-line description of the changes, for the ledger.
    #[must_use]
    pub fn description(&self) -> String {
        self.changes
            .iter()
            .map(Change::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnConfig;
    use crate::dialect::{mysql, sqlite, Capabilities};
    use crate::statement::StatementKind;
    use crate::value::ColumnValue;

    fn scenario_change() -> Change {
        InsertDataChange::new("users")
            .column(
                ColumnConfig::new("id")
                    .with_value(ColumnValue::Integer(1))
                    .auto_increment(),
            )
            .column(ColumnConfig::new("name").with_value(ColumnValue::String("a".into())))
            .into()
    }

    #[test]
    fn test_auto_increment_column_skipped_when_supported() {
        let statements = scenario_change().compile(&sqlite()).unwrap();
        assert_eq!(statements.len(), 1);
        let insert = statements[0].as_insert().unwrap();
        assert_eq!(
            insert.values,
            vec![("name".to_string(), ColumnValue::String("a".into()))]
        );
    }

    #[test]
    fn test_auto_increment_column_kept_when_unsupported() {
        let plain = Dialect::builder("plain")
            .capabilities(Capabilities {
                auto_increment: false,
                ..Capabilities::default()
            })
            .build();
        let statements = scenario_change().compile(&plain).unwrap();
        let insert = statements[0].as_insert().unwrap();
        assert_eq!(insert.values.len(), 2);
        assert_eq!(insert.values[0].0, "id");
    }

    #[test]
    fn test_missing_fields_fail_before_dialect_rules() {
        let change: Change = InsertDataChange::new("").into();
        match change.compile(&sqlite()) {
            Err(ChangeError::Configuration { change, errors }) => {
                assert_eq!(change, "insertData");
                assert!(errors.has_error_for("tableName"));
                assert!(errors.has_error_for("columns"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_clob_declared_type_uses_prepared_path() {
        let change: Change = InsertDataChange::new("docs")
            .column(ColumnConfig::new("id").with_value(ColumnValue::Integer(1)))
            .column(
                ColumnConfig::new("body")
                    .with_type("CLOB")
                    .with_value(ColumnValue::String("text".into())),
            )
            .into();
        let statements = change.compile(&mysql()).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].kind(), StatementKind::PreparedInsert);
    }

    #[test]
    fn test_confirmation_and_filter() {
        let mut insert = InsertDataChange::new("users")
            .column(ColumnConfig::new("name").with_value(ColumnValue::String("a".into())));
        insert.dbms = Some("!sqlite".into());
        let change: Change = insert.into();
        assert_eq!(change.confirmation_message(), "New row inserted into users");
        assert!(!change.applies_to(&sqlite()));
        assert!(change.applies_to(&mysql()));
    }

    #[test]
    fn test_change_json_shape() {
        let json = r#"{
            "type": "insertData",
            "tableName": "users",
            "columns": [{"name": "name", "value": {"kind": "string", "value": "a"}}]
        }"#;
        let change: Change = serde_json::from_str(json).unwrap();
        assert_eq!(change.name(), "insertData");
        assert!(!change.validate().has_errors());
    }

    #[test]
    fn test_change_set_identity() {
        let set = ChangeSet::new("1", "ada", "db/changelog.json")
            .change(CreateTableChange::new("t").column(ColumnConfig::new("id").with_type("int")))
            .change(DropTableChange::new("t"));
        assert_eq!(set.identity(), "db/changelog.json::1::ada");
        assert_eq!(set.description(), "createTable, dropTable");
    }
}
