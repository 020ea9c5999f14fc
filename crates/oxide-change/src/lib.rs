//! # oxide-change
//!
//! Dialect-aware SQL generation for database deployments.
//!
//! Changes describe *what* should happen to a database. This crate turns
//! them into SQL for a specific target and derives a stable checksum so a
//! deployment can tell whether a change was already applied.
//!
//! ## Pieces
//!
//! - [`Dialect`]: capability flags, quoting and type mapping for one kind
//!   of database, collected in a [`DialectRegistry`].
//! - [`Statement`]: an abstract unit of SQL intent.
//! - [`Generator`]: renders one statement kind. Generators compete by
//!   priority inside a [`GeneratorRegistry`].
//! - [`Change`]: user-declared work compiling to statements.
//! - [`checksum`]: stable identities for changes and change sets.
//!
//! ## Example
//!
//! ```rust
//! use oxide_change::prelude::*;
//!
//! let ctx = ChangeContext::standard();
//! let dialect = ctx.dialects().require("postgresql").unwrap();
//!
//! let change: Change = InsertDataChange::new("users")
//!     .column(ColumnConfig::new("id").with_value(ColumnValue::Integer(1)).auto_increment())
//!     .column(ColumnConfig::new("name").with_value(ColumnValue::String("Ada".into())))
//!     .into();
//!
//! let statements = change.compile(&dialect).unwrap();
//! let sql = ctx.generators().generate_sql(&statements[0], &dialect).unwrap();
//! assert_eq!(sql, vec![r#"INSERT INTO "users" ("name") VALUES ('Ada')"#.to_string()]);
//! ```

pub mod change;
pub mod checksum;
pub mod column;
pub mod conformance;
pub mod context;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod statement;
pub mod template;
pub mod types;
pub mod value;

pub use change::{Change, ChangeSet, ColumnSnapshot, NoSnapshot};
pub use checksum::CheckSum;
pub use column::ColumnConfig;
pub use context::ChangeContext;
pub use dialect::{Dialect, DialectRegistry};
pub use error::{ChangeError, ChecksumError, DialectError, RenderError, ResolveError, ValidationErrors};
pub use generator::{Generator, GeneratorRegistry, Sql};
pub use statement::{Statement, StatementKind};
pub use types::DataType;
pub use value::{ColumnValue, SequenceRef};

/// Common imports.
pub mod prelude {
    pub use crate::change::{
        Change, ChangeSet, ColumnSnapshot, CreateSequenceChange, CreateTableChange,
        DropTableChange, InsertDataChange, NoSnapshot,
    };
    pub use crate::checksum::{changeset_checksum, checksum, CheckSum};
    pub use crate::column::ColumnConfig;
    pub use crate::context::ChangeContext;
    pub use crate::dialect::{Capabilities, Dialect, DialectRegistry};
    pub use crate::error::{ChangeError, ResolveError, ValidationErrors};
    pub use crate::generator::{Generator, GeneratorRegistry, Sql, PRIORITY_DATABASE, PRIORITY_DEFAULT};
    pub use crate::statement::{Statement, StatementKind, TableRef};
    pub use crate::types::DataType;
    pub use crate::value::{ColumnValue, SequenceRef};
}
