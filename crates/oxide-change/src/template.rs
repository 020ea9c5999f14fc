//! Expansion of dialect-neutral SQL templates.
//!
//! Templates describe expected SQL once for every dialect:
//!
//! - `[name]` becomes the dialect's quoted identifier. A `[` with no
//!   closing `]` is left alone.
//! - the first `auto_increment_clause` becomes the dialect's clause.
//! - ` int `, ` datetime ` and ` boolean ` (also before a comma) become the
//!   dialect's type tokens.
//! - `FALSE`, `TRUE` and `NOW()` become the dialect's literals.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::dialect::Dialect;
use crate::types::DataType;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("identifier pattern is valid"));

/// Expands a template for a dialect.
#[must_use]
pub fn expand(template: &str, dialect: &Dialect) -> String {
    let escaped = IDENTIFIER.replace_all(template, |caps: &Captures<'_>| {
        dialect.quote_identifier(&caps[1])
    });
    let clauses = escaped.replacen("auto_increment_clause", dialect.auto_increment_clause(), 1);

    let mut sql = clauses;
    for (word, data_type) in [
        ("int", DataType::Integer),
        ("datetime", DataType::DateTime),
        ("boolean", DataType::Boolean),
    ] {
        sql = replace_type(&sql, word, &dialect.type_token(&data_type));
    }

    sql.replace("FALSE", dialect.boolean_literal(false))
        .replace("TRUE", dialect.boolean_literal(true))
        .replace("NOW()", dialect.current_timestamp())
}

fn replace_type(sql: &str, word: &str, token: &str) -> String {
    sql.replace(&format!(" {word} "), &format!(" {token} "))
        .replace(&format!(" {word},"), &format!(" {token},"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{mssql, mysql, postgres, sqlite};

    #[test]
    fn test_backtick_dialect() {
        assert_eq!(
            expand("insert into [foo] (col) values (NOW())", &mysql()),
            "insert into `foo` (col) values (CURRENT_TIMESTAMP)"
        );
    }

    #[test]
    fn test_bracket_quotes_survive() {
        assert_eq!(expand("drop table [t]", &mssql()), "drop table [t]");
        assert_eq!(expand("select [a] from [b]", &postgres()), "select \"a\" from \"b\"");
    }

    #[test]
    fn test_unclosed_bracket_passes_through() {
        assert_eq!(expand("select [a from t", &postgres()), "select [a from t");
    }

    #[test]
    fn test_types_and_literals() {
        assert_eq!(
            expand(
                "create table [t] (id int auto_increment_clause, flag boolean, at datetime, note text)",
                &postgres()
            ),
            "create table \"t\" (id INTEGER GENERATED BY DEFAULT AS IDENTITY, flag BOOLEAN, \
             at TIMESTAMP WITHOUT TIME ZONE, note text)"
        );
        assert_eq!(expand("values (TRUE, FALSE)", &sqlite()), "values (1, 0)");
        assert_eq!(expand("(at datetime)", &postgres()), "(at datetime)");
    }

    #[test]
    fn test_only_first_clause_replaced() {
        assert_eq!(
            expand("a auto_increment_clause b auto_increment_clause", &sqlite()),
            "a AUTOINCREMENT b auto_increment_clause"
        );
    }
}
