//! Target database dialects.
//!
//! A [`Dialect`] is plain data: capability flags, identifier quoting, a type
//! mapper and a handful of expression templates. Generators branch on these
//! facts, never on which database they are talking to.
//!
//! Built-in dialects live in their own modules and are collected by
//! [`DialectRegistry::standard`].

mod informix;
mod mssql;
mod mysql;
mod postgres;
mod registry;
mod sqlite;

pub use informix::informix;
pub use mssql::mssql;
pub use mysql::mysql;
pub use postgres::postgres;
pub use registry::DialectRegistry;
pub use sqlite::sqlite;

use std::fmt;

use crate::types::DataType;
use crate::value::SequenceRef;

/// Maps an abstract type to the dialect's type token.
pub type TypeMapper = fn(&DataType) -> String;

/// What a dialect can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Columns can be generated by the database (identity, serial, ...).
    pub auto_increment: bool,
    /// Objects can be qualified with a schema.
    pub schemas: bool,
    /// Objects can be qualified with a catalog.
    pub catalogs: bool,
    /// `CREATE SEQUENCE` and sequence value functions exist.
    pub sequences: bool,
    /// Large objects can be streamed through prepared statements.
    pub large_object_streaming: bool,
    /// `DROP TABLE ... CASCADE` is accepted.
    pub drop_table_cascade: bool,
    /// Existing large-object columns must be detected through introspection
    /// because inline literals cannot target them.
    pub introspects_large_objects: bool,
}

/// Bind parameter style for prepared statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `@p1`, `@p2`, ...
    AtP,
}

/// A registered target database kind. Immutable once built.
#[derive(Clone)]
pub struct Dialect {
    name: &'static str,
    url_schemes: &'static [&'static str],
    capabilities: Capabilities,
    quote_open: char,
    quote_close: char,
    type_mapper: TypeMapper,
    current_timestamp: &'static str,
    true_literal: &'static str,
    false_literal: &'static str,
    auto_increment_clause: &'static str,
    sequence_next_value: Option<&'static str>,
    sequence_current_value: Option<&'static str>,
    placeholder: Placeholder,
    default_schema: Option<&'static str>,
}

impl Dialect {
    /// Starts building a dialect with ANSI defaults.
    #[must_use]
    pub fn builder(name: &'static str) -> DialectBuilder {
        DialectBuilder::new(name)
    }

    /// Returns the dialect name (`sqlite`, `postgresql`, ...).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the capability flags.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns whether the database generates auto-increment values itself.
    #[must_use]
    pub fn supports_auto_increment(&self) -> bool {
        self.capabilities.auto_increment
    }

    /// Returns whether this dialect answers to the given connection URL.
    #[must_use]
    pub fn matches_url(&self, url: &str) -> bool {
        let url = url.strip_prefix("jdbc:").unwrap_or(url);
        let scheme = url.split(':').next().unwrap_or_default();
        self.url_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }

    /// Quotes an identifier, doubling any embedded closing quote.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let close = self.quote_close.to_string();
        let escaped = name.replace(&close, &format!("{close}{close}"));
        format!("{}{escaped}{}", self.quote_open, self.quote_close)
    }

    /// Escapes a possibly qualified object name.
    ///
    /// Catalog and schema qualifiers are only emitted when the dialect
    /// supports them.
    #[must_use]
    pub fn escape_object_name(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        name: &str,
    ) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.capabilities.catalogs {
            if let Some(catalog) = catalog {
                parts.push(self.quote_identifier(catalog));
            }
        }
        if self.capabilities.schemas {
            if let Some(schema) = schema {
                parts.push(self.quote_identifier(schema));
            }
        }
        parts.push(self.quote_identifier(name));
        parts.join(".")
    }

    /// Renders a string literal.
    #[must_use]
    pub fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Maps an abstract type to this dialect's type token.
    #[must_use]
    pub fn type_token(&self, data_type: &DataType) -> String {
        (self.type_mapper)(data_type)
    }

    /// Renders a boolean literal.
    #[must_use]
    pub fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            self.true_literal
        } else {
            self.false_literal
        }
    }

    /// Returns the current timestamp expression.
    #[must_use]
    pub fn current_timestamp(&self) -> &'static str {
        self.current_timestamp
    }

    /// Returns the clause appended to auto-increment column definitions.
    #[must_use]
    pub fn auto_increment_clause(&self) -> &'static str {
        self.auto_increment_clause
    }

    /// Renders the next-value expression for a sequence, if the dialect has one.
    #[must_use]
    pub fn sequence_next_value(&self, sequence: &SequenceRef) -> Option<String> {
        self.sequence_next_value
            .map(|template| self.render_sequence(template, sequence))
    }

    /// Renders the current-value expression for a sequence, if the dialect has one.
    #[must_use]
    pub fn sequence_current_value(&self, sequence: &SequenceRef) -> Option<String> {
        self.sequence_current_value
            .map(|template| self.render_sequence(template, sequence))
    }

    fn render_sequence(&self, template: &str, sequence: &SequenceRef) -> String {
        let name = self.escape_object_name(None, sequence.schema.as_deref(), &sequence.name);
        template.replace("{}", &name)
    }

    /// Returns the bind placeholder for the 1-based parameter index.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        match self.placeholder {
            Placeholder::Question => "?".to_string(),
            Placeholder::Dollar => format!("${index}"),
            Placeholder::AtP => format!("@p{index}"),
        }
    }

    /// Returns the schema objects land in when none is given.
    #[must_use]
    pub fn default_schema(&self) -> Option<&'static str> {
        self.default_schema
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn ansi_type_token(data_type: &DataType) -> String {
    match data_type {
        DataType::SmallInt => "SMALLINT".to_string(),
        DataType::Integer => "INTEGER".to_string(),
        DataType::BigInt => "BIGINT".to_string(),
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Date => "DATE".to_string(),
        DataType::Time => "TIME".to_string(),
        DataType::DateTime | DataType::Timestamp => "TIMESTAMP".to_string(),
        DataType::Char(Some(n)) => format!("CHAR({n})"),
        DataType::Char(None) => "CHAR".to_string(),
        DataType::Varchar(Some(n)) => format!("VARCHAR({n})"),
        DataType::Varchar(None) => "VARCHAR".to_string(),
        DataType::Text | DataType::Clob => "CLOB".to_string(),
        DataType::Decimal { .. } => decimal_token("DECIMAL", data_type),
        DataType::Double => "DOUBLE PRECISION".to_string(),
        DataType::Float => "FLOAT".to_string(),
        DataType::Blob => "BLOB".to_string(),
        DataType::Uuid => "CHAR(36)".to_string(),
        DataType::Custom(name) => name.clone(),
    }
}

/// Renders `NAME`, `NAME(p)` or `NAME(p, s)` for a decimal type.
pub(crate) fn decimal_token(name: &str, data_type: &DataType) -> String {
    match data_type {
        DataType::Decimal {
            precision: Some(p),
            scale: Some(s),
        } => format!("{name}({p}, {s})"),
        DataType::Decimal {
            precision: Some(p),
            scale: None,
        } => format!("{name}({p})"),
        _ => name.to_string(),
    }
}

/// Builder for [`Dialect`].
#[derive(Clone)]
pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    fn new(name: &'static str) -> Self {
        Self {
            dialect: Dialect {
                name,
                url_schemes: &[],
                capabilities: Capabilities::default(),
                quote_open: '"',
                quote_close: '"',
                type_mapper: ansi_type_token,
                current_timestamp: "CURRENT_TIMESTAMP",
                true_literal: "TRUE",
                false_literal: "FALSE",
                auto_increment_clause: "",
                sequence_next_value: None,
                sequence_current_value: None,
                placeholder: Placeholder::Question,
                default_schema: None,
            },
        }
    }

    /// URL schemes used to find this dialect from a connection string.
    #[must_use]
    pub fn url_schemes(mut self, schemes: &'static [&'static str]) -> Self {
        self.dialect.url_schemes = schemes;
        self
    }

    /// Capability flags.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.dialect.capabilities = capabilities;
        self
    }

    /// Identifier quote characters.
    #[must_use]
    pub fn quotes(mut self, open: char, close: char) -> Self {
        self.dialect.quote_open = open;
        self.dialect.quote_close = close;
        self
    }

    /// Type mapping function.
    #[must_use]
    pub fn type_mapper(mut self, mapper: TypeMapper) -> Self {
        self.dialect.type_mapper = mapper;
        self
    }

    /// Current timestamp expression.
    #[must_use]
    pub fn current_timestamp(mut self, expression: &'static str) -> Self {
        self.dialect.current_timestamp = expression;
        self
    }

    /// Boolean literal tokens.
    #[must_use]
    pub fn boolean_literals(mut self, true_literal: &'static str, false_literal: &'static str) -> Self {
        self.dialect.true_literal = true_literal;
        self.dialect.false_literal = false_literal;
        self
    }

    /// Clause appended to auto-increment column definitions.
    #[must_use]
    pub fn auto_increment_clause(mut self, clause: &'static str) -> Self {
        self.dialect.auto_increment_clause = clause;
        self
    }

    /// Sequence value templates; `{}` is replaced by the escaped sequence name.
    #[must_use]
    pub fn sequence_functions(
        mut self,
        next_value: Option<&'static str>,
        current_value: Option<&'static str>,
    ) -> Self {
        self.dialect.sequence_next_value = next_value;
        self.dialect.sequence_current_value = current_value;
        self
    }

    /// Bind placeholder style.
    #[must_use]
    pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
        self.dialect.placeholder = placeholder;
        self
    }

    /// Schema used when none is given.
    #[must_use]
    pub fn default_schema(mut self, schema: &'static str) -> Self {
        self.dialect.default_schema = Some(schema);
        self
    }

    /// Finishes the dialect.
    #[must_use]
    pub fn build(self) -> Dialect {
        self.dialect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_doubles_close_quote() {
        let d = Dialect::builder("ansi").build();
        assert_eq!(d.quote_identifier("users"), "\"users\"");
        assert_eq!(d.quote_identifier("we\"ird"), "\"we\"\"ird\"");

        let brackets = Dialect::builder("brackets").quotes('[', ']').build();
        assert_eq!(brackets.quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn test_escape_object_name_respects_capabilities() {
        let flat = Dialect::builder("flat").build();
        assert_eq!(
            flat.escape_object_name(Some("cat"), Some("app"), "users"),
            "\"users\""
        );

        let qualified = Dialect::builder("qualified")
            .capabilities(Capabilities {
                schemas: true,
                catalogs: true,
                ..Capabilities::default()
            })
            .build();
        assert_eq!(
            qualified.escape_object_name(Some("cat"), Some("app"), "users"),
            "\"cat\".\"app\".\"users\""
        );
        assert_eq!(
            qualified.escape_object_name(None, Some("app"), "users"),
            "\"app\".\"users\""
        );
    }

    #[test]
    fn test_matches_url() {
        let d = Dialect::builder("pg")
            .url_schemes(&["postgres", "postgresql"])
            .build();
        assert!(d.matches_url("postgres://localhost/app"));
        assert!(d.matches_url("jdbc:postgresql://localhost/app"));
        assert!(!d.matches_url("sqlite::memory:"));
    }

    #[test]
    fn test_placeholders() {
        let q = Dialect::builder("q").build();
        let dollar = Dialect::builder("d").placeholder(Placeholder::Dollar).build();
        assert_eq!(q.placeholder(2), "?");
        assert_eq!(dollar.placeholder(2), "$2");
    }

    #[test]
    fn test_string_literal() {
        let d = Dialect::builder("ansi").build();
        assert_eq!(d.quote_string("O'Brien"), "'O''Brien'");
    }
}
