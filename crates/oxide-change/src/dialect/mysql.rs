//! MySQL / MariaDB dialect.
//!
//! MySQL has no schemas distinct from databases; databases are exposed as
//! catalogs.

use super::{decimal_token, Capabilities, Dialect, Placeholder};
use crate::types::DataType;

/// Builds the MySQL dialect.
#[must_use]
pub fn mysql() -> Dialect {
    Dialect::builder("mysql")
        .url_schemes(&["mysql", "mariadb"])
        .capabilities(Capabilities {
            auto_increment: true,
            schemas: false,
            catalogs: true,
            sequences: false,
            large_object_streaming: true,
            drop_table_cascade: false,
            introspects_large_objects: false,
        })
        .quotes('`', '`')
        .type_mapper(type_token)
        .current_timestamp("CURRENT_TIMESTAMP")
        .boolean_literals("1", "0")
        .auto_increment_clause("AUTO_INCREMENT")
        .placeholder(Placeholder::Question)
        .build()
}

fn type_token(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt => "SMALLINT".to_string(),
        DataType::Integer => "INT".to_string(),
        DataType::BigInt => "BIGINT".to_string(),
        DataType::Boolean => "BIT(1)".to_string(),
        DataType::Date => "date".to_string(),
        DataType::Time => "time".to_string(),
        DataType::DateTime | DataType::Timestamp => "datetime".to_string(),
        DataType::Char(Some(n)) => format!("CHAR({n})"),
        DataType::Char(None) => "CHAR".to_string(),
        DataType::Varchar(Some(n)) => format!("VARCHAR({n})"),
        DataType::Varchar(None) => "VARCHAR(255)".to_string(),
        DataType::Text => "TEXT".to_string(),
        DataType::Clob => "LONGTEXT".to_string(),
        DataType::Decimal { .. } => decimal_token("DECIMAL", data_type),
        DataType::Double => "DOUBLE".to_string(),
        DataType::Float => "FLOAT".to_string(),
        DataType::Blob => "LONGBLOB".to_string(),
        DataType::Uuid => "CHAR(36)".to_string(),
        DataType::Custom(name) => name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_dialect() {
        let d = mysql();
        assert_eq!(d.quote_identifier("foo"), "`foo`");
        assert_eq!(d.current_timestamp(), "CURRENT_TIMESTAMP");
        assert_eq!(d.type_token(&DataType::Integer), "INT");
        assert_eq!(d.type_token(&DataType::Boolean), "BIT(1)");
        assert!(d.matches_url("mariadb://db/app"));
        assert_eq!(d.escape_object_name(Some("app"), Some("ignored"), "t"), "`app`.`t`");
    }
}
