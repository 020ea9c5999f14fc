//! Microsoft SQL Server dialect.

use super::{decimal_token, Capabilities, Dialect, Placeholder};
use crate::types::DataType;

/// Builds the SQL Server dialect.
#[must_use]
pub fn mssql() -> Dialect {
    Dialect::builder("mssql")
        .url_schemes(&["mssql", "sqlserver"])
        .capabilities(Capabilities {
            auto_increment: true,
            schemas: true,
            catalogs: true,
            sequences: true,
            large_object_streaming: true,
            drop_table_cascade: false,
            introspects_large_objects: false,
        })
        .quotes('[', ']')
        .type_mapper(type_token)
        .current_timestamp("GETDATE()")
        .boolean_literals("1", "0")
        .auto_increment_clause("IDENTITY (1, 1)")
        .sequence_functions(Some("NEXT VALUE FOR {}"), None)
        .placeholder(Placeholder::AtP)
        .default_schema("dbo")
        .build()
}

fn type_token(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt => "smallint".to_string(),
        DataType::Integer => "int".to_string(),
        DataType::BigInt => "bigint".to_string(),
        DataType::Boolean => "bit".to_string(),
        DataType::Date => "date".to_string(),
        DataType::Time => "time".to_string(),
        DataType::DateTime | DataType::Timestamp => "datetime".to_string(),
        DataType::Char(Some(n)) => format!("char({n})"),
        DataType::Char(None) => "char".to_string(),
        DataType::Varchar(Some(n)) => format!("varchar({n})"),
        DataType::Varchar(None) => "varchar(MAX)".to_string(),
        DataType::Text | DataType::Clob => "varchar(MAX)".to_string(),
        DataType::Decimal { .. } => decimal_token("decimal", data_type),
        DataType::Double => "float(53)".to_string(),
        DataType::Float => "real".to_string(),
        DataType::Blob => "varbinary(MAX)".to_string(),
        DataType::Uuid => "uniqueidentifier".to_string(),
        DataType::Custom(name) => name.clone(),
    }
}
