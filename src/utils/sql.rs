//! SQL text helpers.

/// Quotes an SQLite identifier (table or column name).
///
/// Table and column names come from configuration, so they are always quoted and
/// embedded double quotes are doubled.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
