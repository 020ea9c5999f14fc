//! SQL generators and their registry.
//!
//! A [`Generator`] renders one [`StatementKind`] for the dialects it
//! supports. Several generators may compete for the same statement; the
//! [`GeneratorRegistry`] picks the eligible one with the highest priority.

mod common;
mod create_table;
mod drop_table;
mod insert;
mod prepared;
mod registry;
mod sequence;

pub use common::render_value;
pub use create_table::{CreateTableGenerator, SqliteCreateTableGenerator};
pub use drop_table::DropTableGenerator;
pub use insert::InsertGenerator;
pub use prepared::PreparedInsertGenerator;
pub use registry::GeneratorRegistry;
pub use sequence::{CreateSequenceGenerator, DropSequenceGenerator};

use crate::dialect::Dialect;
use crate::error::{RenderError, ValidationErrors};
use crate::statement::{Statement, StatementKind};

/// A rendered SQL fragment.
pub type Sql = String;

/// Priority of generic generators.
pub const PRIORITY_DEFAULT: i32 = 1;

/// Priority of generators written for one specific database.
pub const PRIORITY_DATABASE: i32 = 5;

/// A strategy that renders one statement kind into SQL.
pub trait Generator: Send + Sync {
    /// Returns a short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the statement kind this generator renders.
    fn kind(&self) -> StatementKind;

    /// Returns the priority; higher wins among eligible generators.
    fn priority(&self) -> i32 {
        PRIORITY_DEFAULT
    }

    /// Returns whether this generator applies to the statement on the dialect.
    fn supports(&self, _statement: &Statement, _dialect: &Dialect) -> bool {
        true
    }

    /// Checks the statement for field-level problems.
    fn validate(&self, statement: &Statement, dialect: &Dialect) -> ValidationErrors;

    /// Renders the statement into ordered SQL fragments.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the statement cannot be rendered; no
    /// fragments are produced in that case.
    fn generate(&self, statement: &Statement, dialect: &Dialect) -> Result<Vec<Sql>, RenderError>;
}
