//! PostgreSQL dialect.

use super::{decimal_token, Capabilities, Dialect, Placeholder};
use crate::types::DataType;

/// Builds the PostgreSQL dialect.
#[must_use]
pub fn postgres() -> Dialect {
    Dialect::builder("postgresql")
        .url_schemes(&["postgres", "postgresql"])
        .capabilities(Capabilities {
            auto_increment: true,
            schemas: true,
            catalogs: false,
            sequences: true,
            large_object_streaming: true,
            drop_table_cascade: true,
            introspects_large_objects: false,
        })
        .type_mapper(type_token)
        .current_timestamp("NOW()")
        .boolean_literals("TRUE", "FALSE")
        .auto_increment_clause("GENERATED BY DEFAULT AS IDENTITY")
        .sequence_functions(Some("nextval('{}')"), Some("currval('{}')"))
        .placeholder(Placeholder::Dollar)
        .default_schema("public")
        .build()
}

fn type_token(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt => "SMALLINT".to_string(),
        DataType::Integer => "INTEGER".to_string(),
        DataType::BigInt => "BIGINT".to_string(),
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Date => "DATE".to_string(),
        DataType::Time => "TIME WITHOUT TIME ZONE".to_string(),
        DataType::DateTime | DataType::Timestamp => "TIMESTAMP WITHOUT TIME ZONE".to_string(),
        DataType::Char(Some(n)) => format!("CHAR({n})"),
        DataType::Char(None) => "CHAR".to_string(),
        DataType::Varchar(Some(n)) => format!("VARCHAR({n})"),
        DataType::Varchar(None) => "VARCHAR".to_string(),
        DataType::Text | DataType::Clob => "TEXT".to_string(),
        DataType::Decimal { .. } => decimal_token("DECIMAL", data_type),
        DataType::Double => "DOUBLE PRECISION".to_string(),
        DataType::Float => "REAL".to_string(),
        DataType::Blob => "BYTEA".to_string(),
        DataType::Uuid => "UUID".to_string(),
        DataType::Custom(name) => name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SequenceRef;

    #[test]
    fn test_postgres_dialect() {
        let d = postgres();
        assert_eq!(d.name(), "postgresql");
        assert!(d.capabilities().sequences);
        assert_eq!(d.type_token(&DataType::DateTime), "TIMESTAMP WITHOUT TIME ZONE");
        assert_eq!(d.type_token(&DataType::Blob), "BYTEA");
        assert_eq!(d.placeholder(3), "$3");
    }

    #[test]
    fn test_postgres_sequence_functions() {
        let d = postgres();
        let seq = SequenceRef::new("order_seq").in_schema("sales");
        assert_eq!(
            d.sequence_next_value(&seq).as_deref(),
            Some("nextval('\"sales\".\"order_seq\"')")
        );
        assert_eq!(
            d.sequence_current_value(&SequenceRef::new("order_seq")).as_deref(),
            Some("currval('\"order_seq\"')")
        );
    }
}
