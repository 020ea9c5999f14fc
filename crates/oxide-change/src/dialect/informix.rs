//! Informix dialect.
//!
//! Informix rejects inline literals targeting existing CLOB/BLOB columns, so
//! inserts must look at the live column type and switch to the prepared path.

use super::{decimal_token, Capabilities, Dialect, Placeholder};
use crate::types::DataType;

/// Builds the Informix dialect.
#[must_use]
pub fn informix() -> Dialect {
    Dialect::builder("informix")
        .url_schemes(&["informix", "informix-sqli"])
        .capabilities(Capabilities {
            auto_increment: true,
            schemas: true,
            catalogs: true,
            sequences: true,
            large_object_streaming: true,
            drop_table_cascade: true,
            introspects_large_objects: true,
        })
        .type_mapper(type_token)
        .current_timestamp("CURRENT YEAR TO FRACTION(5)")
        .boolean_literals("'t'", "'f'")
        .sequence_functions(Some("{}.NEXTVAL"), Some("{}.CURRVAL"))
        .placeholder(Placeholder::Question)
        .build()
}

fn type_token(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt => "SMALLINT".to_string(),
        DataType::Integer => "INTEGER".to_string(),
        DataType::BigInt => "INT8".to_string(),
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Date => "DATE".to_string(),
        DataType::Time => "INTERVAL HOUR TO FRACTION(5)".to_string(),
        DataType::DateTime | DataType::Timestamp => "DATETIME YEAR TO FRACTION(5)".to_string(),
        DataType::Char(Some(n)) => format!("CHAR({n})"),
        DataType::Char(None) => "CHAR".to_string(),
        DataType::Varchar(Some(n)) => format!("VARCHAR({n})"),
        DataType::Varchar(None) => "VARCHAR(255)".to_string(),
        DataType::Text => "TEXT".to_string(),
        DataType::Clob => "CLOB".to_string(),
        DataType::Decimal { .. } => decimal_token("DECIMAL", data_type),
        DataType::Double => "FLOAT".to_string(),
        DataType::Float => "SMALLFLOAT".to_string(),
        DataType::Blob => "BLOB".to_string(),
        DataType::Uuid => "CHAR(36)".to_string(),
        DataType::Custom(name) => name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_informix_dialect() {
        let d = informix();
        assert!(d.capabilities().introspects_large_objects);
        assert_eq!(d.type_token(&DataType::DateTime), "DATETIME YEAR TO FRACTION(5)");
        assert_eq!(d.boolean_literal(false), "'f'");
    }
}
