//! SQL text for the fixed queries run against extracted caches.
//!
//! Table names come from a schema descriptor and may be user supplied, so
//! they are always quoted as identifiers rather than spliced in raw.

/// Does a table with the given name exist? Bound parameter: table name.
pub const TABLE_EXISTS: &str =
    "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1";

/// Names of all user tables, alphabetically.
pub const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Every row and every column of a table, in storage order.
pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", quote_identifier(table))
}

/// Row count of a table.
pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_identifier(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_quotes_table() {
        assert_eq!(select_all("ZRTCLLOCATIONMO"), "SELECT * FROM \"ZRTCLLOCATIONMO\"");
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            count_rows("x\"; DROP TABLE y; --"),
            "SELECT COUNT(*) FROM \"x\"\"; DROP TABLE y; --\""
        );
    }
}
