//! Abstract, dialect-independent statements.
//!
//! A [`Statement`] says *what* should happen, never *how* a database spells
//! it. Generators turn statements into SQL for a given
//! [`Dialect`](crate::dialect::Dialect).

use std::fmt;

use crate::column::ColumnConfig;
use crate::dialect::Dialect;
use crate::types::DataType;
use crate::value::ColumnValue;

/// The kind of a statement; generators are bound to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatementKind {
    /// Literal insert.
    Insert,
    /// Parameterized insert used for streaming large objects.
    PreparedInsert,
    /// Table creation.
    CreateTable,
    /// Table removal.
    DropTable,
    /// Sequence creation.
    CreateSequence,
    /// Sequence removal.
    DropSequence,
}

impl StatementKind {
    /// Returns the camel-case name used in messages and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::PreparedInsert => "preparedInsert",
            Self::CreateTable => "createTable",
            Self::DropTable => "dropTable",
            Self::CreateSequence => "createSequence",
            Self::DropSequence => "dropSequence",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A possibly qualified object name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TableRef {
    /// Catalog qualifier.
    pub catalog: Option<String>,
    /// Schema qualifier.
    pub schema: Option<String>,
    /// Object name.
    pub name: String,
}

impl TableRef {
    /// Creates an unqualified reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    /// Sets the schema qualifier.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the catalog qualifier.
    #[must_use]
    pub fn in_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Renders the escaped name for a dialect.
    #[must_use]
    pub fn escaped(&self, dialect: &Dialect) -> String {
        dialect.escape_object_name(
            self.catalog.as_deref(),
            self.schema.as_deref(),
            &self.name,
        )
    }
}

/// Options shared by every statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementOptions {
    /// Free text prefixed to the first rendered fragment.
    pub prologue: Option<String>,
    /// Free text suffixed to the last rendered fragment.
    pub epilogue: Option<String>,
    /// Execution failures of this statement are logged and ignored.
    pub continue_on_error: bool,
    /// An unsupported statement is skipped instead of failing the run.
    pub skip_on_unsupported: bool,
}

/// Insert one row of literal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    /// Target table.
    pub table: TableRef,
    /// Column and value pairs in declared order.
    pub values: Vec<(String, ColumnValue)>,
}

/// Insert one row through a parameterized statement.
///
/// Columns are kept exactly as declared; large-object file values are bound
/// as parameters at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInsert {
    /// Target table.
    pub table: TableRef,
    /// Columns as declared by the change.
    pub columns: Vec<ColumnConfig>,
}

impl PreparedInsert {
    /// Returns the values sent as bind parameters, in placeholder order.
    ///
    /// A column without a value is bound as NULL.
    pub fn parameters(&self) -> impl Iterator<Item = Option<&ColumnValue>> {
        self.columns
            .iter()
            .map(|c| c.value.as_ref())
            .filter(|v| is_parameter(*v))
    }
}

/// Returns true if a prepared-insert value is bound rather than inlined.
#[must_use]
pub fn is_parameter(value: Option<&ColumnValue>) -> bool {
    value.is_none_or(ColumnValue::is_bindable)
}

/// A column in a table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Abstract type.
    pub data_type: DataType,
    /// Part of the primary key.
    pub primary_key: bool,
    /// NULL allowed.
    pub nullable: bool,
    /// Generated by the database.
    pub auto_increment: bool,
    /// Default value.
    pub default: Option<ColumnValue>,
}

impl ColumnDefinition {
    /// Creates a nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            nullable: true,
            auto_increment: false,
            default: None,
        }
    }
}

/// Create a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    /// Table to create.
    pub table: TableRef,
    /// Column definitions in order.
    pub columns: Vec<ColumnDefinition>,
}

/// Drop a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTable {
    /// Table to drop.
    pub table: TableRef,
    /// Also drop dependent constraints.
    pub cascade: bool,
    /// Do not fail when the table is absent.
    pub if_exists: bool,
}

/// Create a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSequence {
    /// Sequence to create.
    pub sequence: TableRef,
    /// First value.
    pub start: Option<i64>,
    /// Step between values.
    pub increment: Option<i64>,
}

/// Drop a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropSequence {
    /// Sequence to drop.
    pub sequence: TableRef,
}

/// The statement payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementBody {
    /// Literal insert.
    Insert(Insert),
    /// Parameterized insert.
    PreparedInsert(PreparedInsert),
    /// Create table.
    CreateTable(CreateTable),
    /// Drop table.
    DropTable(DropTable),
    /// Create sequence.
    CreateSequence(CreateSequence),
    /// Drop sequence.
    DropSequence(DropSequence),
}

/// An abstract statement plus its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    body: StatementBody,
    options: StatementOptions,
}

impl Statement {
    /// Wraps a payload with default options.
    #[must_use]
    pub fn new(body: StatementBody) -> Self {
        Self {
            body,
            options: StatementOptions::default(),
        }
    }

    /// Returns the statement kind.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        match &self.body {
            StatementBody::Insert(_) => StatementKind::Insert,
            StatementBody::PreparedInsert(_) => StatementKind::PreparedInsert,
            StatementBody::CreateTable(_) => StatementKind::CreateTable,
            StatementBody::DropTable(_) => StatementKind::DropTable,
            StatementBody::CreateSequence(_) => StatementKind::CreateSequence,
            StatementBody::DropSequence(_) => StatementKind::DropSequence,
        }
    }

    /// Returns the payload.
    #[must_use]
    pub fn body(&self) -> &StatementBody {
        &self.body
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &StatementOptions {
        &self.options
    }

    /// Replaces all options.
    #[must_use]
    pub fn with_options(mut self, options: StatementOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the prologue.
    #[must_use]
    pub fn with_prologue(mut self, prologue: impl Into<String>) -> Self {
        self.options.prologue = Some(prologue.into());
        self
    }

    /// Sets the epilogue.
    #[must_use]
    pub fn with_epilogue(mut self, epilogue: impl Into<String>) -> Self {
        self.options.epilogue = Some(epilogue.into());
        self
    }

    /// Sets whether execution failures are ignored.
    #[must_use]
    pub fn continue_on_error(mut self, value: bool) -> Self {
        self.options.continue_on_error = value;
        self
    }

    /// Sets whether an unsupported statement is skipped.
    #[must_use]
    pub fn skip_on_unsupported(mut self, value: bool) -> Self {
        self.options.skip_on_unsupported = value;
        self
    }

    /// Returns the insert payload, if this is a literal insert.
    #[must_use]
    pub fn as_insert(&self) -> Option<&Insert> {
        match &self.body {
            StatementBody::Insert(insert) => Some(insert),
            _ => None,
        }
    }

    /// Returns the prepared insert payload, if this is one.
    #[must_use]
    pub fn as_prepared_insert(&self) -> Option<&PreparedInsert> {
        match &self.body {
            StatementBody::PreparedInsert(insert) => Some(insert),
            _ => None,
        }
    }
}

macro_rules! impl_from_body {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Statement {
                fn from(body: $variant) -> Self {
                    Self::new(StatementBody::$variant(body))
                }
            }
        )*
    };
}

impl_from_body!(
    Insert,
    PreparedInsert,
    CreateTable,
    DropTable,
    CreateSequence,
    DropSequence
);
