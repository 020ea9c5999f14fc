//! SQLite dialect.
//!
//! SQLite has dynamic typing with type affinity, so most abstract types
//! collapse onto a handful of storage classes.

use super::{Capabilities, Dialect, Placeholder};
use crate::types::DataType;

/// Builds the SQLite dialect.
#[must_use]
pub fn sqlite() -> Dialect {
    Dialect::builder("sqlite")
        .url_schemes(&["sqlite"])
        .capabilities(Capabilities {
            auto_increment: true,
            large_object_streaming: true,
            ..Capabilities::default()
        })
        .type_mapper(type_token)
        .current_timestamp("CURRENT_TIMESTAMP")
        .boolean_literals("1", "0")
        .auto_increment_clause("AUTOINCREMENT")
        .placeholder(Placeholder::Question)
        .build()
}

fn type_token(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt | DataType::Integer | DataType::BigInt => "INTEGER".to_string(),
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Float | DataType::Double => "REAL".to_string(),
        DataType::Decimal { .. } => "NUMERIC".to_string(),
        DataType::Char(_) | DataType::Varchar(_) | DataType::Text | DataType::Clob => {
            "TEXT".to_string()
        }
        DataType::Date | DataType::Time | DataType::DateTime | DataType::Timestamp => {
            "TEXT".to_string()
        }
        DataType::Uuid => "TEXT".to_string(),
        DataType::Blob => "BLOB".to_string(),
        DataType::Custom(name) => name.clone(),
    }
}
