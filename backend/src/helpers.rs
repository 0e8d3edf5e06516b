//! Small shared string helpers

/// Escape single quotes for embedding a value in a SQL string literal.
///
/// "L'EPICERIE" → "L''EPICERIE"
pub fn sql_quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render an optional value as a quoted SQL literal or the NULL marker.
pub fn sql_quote_opt(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", sql_quote(v)),
        None => "NULL".to_string(),
    }
}
