//! Abstract data types.
//!
//! Changes declare column types as free text (`"varchar(255)"`, `"CLOB"`,
//! `"int"`). [`DataType::parse`] turns that text into a dialect-independent
//! type which each [`Dialect`](crate::dialect::Dialect) then maps to its own
//! type token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dialect-independent column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Boolean.
    Boolean,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    DateTime,
    /// Timestamp.
    Timestamp,
    /// Fixed-length character string.
    Char(Option<u32>),
    /// Variable-length character string.
    Varchar(Option<u32>),
    /// Unbounded text.
    Text,
    /// Exact numeric with optional precision and scale.
    Decimal {
        /// Total number of digits.
        precision: Option<u8>,
        /// Digits after the decimal point.
        scale: Option<u8>,
    },
    /// Double precision floating point.
    Double,
    /// Single precision floating point.
    Float,
    /// Binary large object.
    Blob,
    /// Character large object.
    Clob,
    /// UUID.
    Uuid,
    /// Any other type, passed through verbatim.
    Custom(String),
}

impl DataType {
    /// Parses a declared type name such as `varchar(255)` or `CLOB`.
    ///
    /// Unknown names become [`DataType::Custom`] with the original text.
    #[must_use]
    pub fn parse(declared: &str) -> Self {
        let declared = declared.trim();
        let (base, params) = match declared.find('(') {
            Some(open) => {
                let close = declared.rfind(')').unwrap_or(declared.len());
                let inner = if close > open {
                    &declared[open + 1..close]
                } else {
                    ""
                };
                (declared[..open].trim(), parse_params(inner))
            }
            None => (declared, Vec::new()),
        };

        let first = params.first().copied();
        let second = params.get(1).copied();

        match base.to_ascii_lowercase().as_str() {
            "smallint" | "int2" | "tinyint" => Self::SmallInt,
            "int" | "integer" | "int4" | "mediumint" => Self::Integer,
            "bigint" | "int8" | "long" => Self::BigInt,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" | "smalldatetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "char" | "character" | "nchar" => Self::Char(first),
            "varchar" | "character varying" | "nvarchar" | "varchar2" => Self::Varchar(first),
            "text" | "ntext" | "longtext" => Self::Text,
            "decimal" | "numeric" | "number" => Self::Decimal {
                precision: first.and_then(|p| u8::try_from(p).ok()),
                scale: second.and_then(|s| u8::try_from(s).ok()),
            },
            "double" | "double precision" => Self::Double,
            "float" | "real" => Self::Float,
            "blob" | "longblob" | "bytea" | "binary large object" => Self::Blob,
            "clob" | "nclob" | "character large object" => Self::Clob,
            "uuid" | "uniqueidentifier" => Self::Uuid,
            _ => Self::Custom(declared.to_string()),
        }
    }

    /// Returns true for the large-object kinds that must be streamed.
    #[must_use]
    pub fn is_large_object(&self) -> bool {
        matches!(self, Self::Blob | Self::Clob)
    }
}

fn parse_params(inner: &str) -> Vec<u32> {
    inner
        .split(',')
        .filter_map(|p| p.trim().parse::<u32>().ok())
        .collect()
}

impl From<&str> for DataType {
    fn from(declared: &str) -> Self {
        Self::parse(declared)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallInt => f.write_str("smallint"),
            Self::Integer => f.write_str("int"),
            Self::BigInt => f.write_str("bigint"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::Time => f.write_str("time"),
            Self::DateTime => f.write_str("datetime"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Char(Some(n)) => write!(f, "char({n})"),
            Self::Char(None) => f.write_str("char"),
            Self::Varchar(Some(n)) => write!(f, "varchar({n})"),
            Self::Varchar(None) => f.write_str("varchar"),
            Self::Text => f.write_str("text"),
            Self::Decimal {
                precision: Some(p),
                scale: Some(s),
            } => write!(f, "decimal({p}, {s})"),
            Self::Decimal {
                precision: Some(p),
                scale: None,
            } => write!(f, "decimal({p})"),
            Self::Decimal { .. } => f.write_str("decimal"),
            Self::Double => f.write_str("double"),
            Self::Float => f.write_str("float"),
            Self::Blob => f.write_str("blob"),
            Self::Clob => f.write_str("clob"),
            Self::Uuid => f.write_str("uuid"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_names() {
        assert_eq!(DataType::parse("int"), DataType::Integer);
        assert_eq!(DataType::parse("INTEGER"), DataType::Integer);
        assert_eq!(DataType::parse("bigint"), DataType::BigInt);
        assert_eq!(DataType::parse(" boolean "), DataType::Boolean);
        assert_eq!(DataType::parse("datetime"), DataType::DateTime);
    }

    #[test]
    fn test_parse_parameters() {
        assert_eq!(DataType::parse("varchar(255)"), DataType::Varchar(Some(255)));
        assert_eq!(DataType::parse("CHAR( 3 )"), DataType::Char(Some(3)));
        assert_eq!(
            DataType::parse("decimal(10, 2)"),
            DataType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }
        );
    }

    #[test]
    fn test_large_objects() {
        assert!(DataType::parse("CLOB").is_large_object());
        assert!(DataType::parse("blob").is_large_object());
        assert!(!DataType::parse("text").is_large_object());
        assert!(!DataType::parse("varchar(10)").is_large_object());
    }

    #[test]
    fn test_custom_passthrough() {
        assert_eq!(
            DataType::parse("geometry(Point, 4326)"),
            DataType::Custom("geometry(Point, 4326)".to_string())
        );
    }
}
