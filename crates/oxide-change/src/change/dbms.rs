//! DBMS filter evaluation.
//!
//! A filter is a comma separated list of dialect names. `all` and `none` are
//! keywords, and a `!` prefix excludes a dialect. A filter made only of
//! exclusions admits every dialect not excluded.

use crate::dialect::Dialect;

/// Returns whether a change carrying `filter` applies to `dialect`.
#[must_use]
pub fn matches(filter: Option<&str>, dialect: &Dialect) -> bool {
    let entries: Vec<&str> = filter
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();
    if entries.is_empty() {
        return true;
    }

    let is_dialect = |name: &str| name.eq_ignore_ascii_case(dialect.name());

    if entries.iter().any(|e| e.eq_ignore_ascii_case("none")) {
        return false;
    }
    if entries.iter().any(|e| e.eq_ignore_ascii_case("all")) {
        return true;
    }
    if entries
        .iter()
        .filter_map(|e| e.strip_prefix('!'))
        .any(|name| is_dialect(name.trim()))
    {
        return false;
    }
    if entries.iter().all(|e| e.starts_with('!')) {
        return true;
    }
    entries.iter().any(|e| is_dialect(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{mysql, postgres, sqlite};

    #[test]
    fn test_empty_filter_matches() {
        assert!(matches(None, &sqlite()));
        assert!(matches(Some("  "), &sqlite()));
    }

    #[test]
    fn test_inclusion_list() {
        assert!(matches(Some("postgresql, mysql"), &mysql()));
        assert!(!matches(Some("postgresql, mysql"), &sqlite()));
        assert!(matches(Some("SQLite"), &sqlite()));
    }

    #[test]
    fn test_exclusions() {
        assert!(!matches(Some("!mysql"), &mysql()));
        assert!(matches(Some("!mysql"), &postgres()));
        assert!(!matches(Some("postgresql, !postgresql"), &postgres()));
    }

    #[test]
    fn test_keywords() {
        assert!(matches(Some("all"), &sqlite()));
        assert!(!matches(Some("none"), &sqlite()));
        assert!(!matches(Some("all, none"), &sqlite()));
    }
}
