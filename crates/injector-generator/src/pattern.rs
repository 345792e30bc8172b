//! Name generation.
//!
//! Generated rows are named `{prefix}_{index}`. Patterns may also embed the
//! index anywhere with an `{index}` placeholder, e.g. `user_{index}@localhost`.

/// `{prefix}_{index}`.
pub fn numbered(prefix: &str, index: i64) -> String {
    format!("{prefix}_{index}")
}

/// Replace every `{index}` placeholder of a pattern.
pub fn render(pattern: &str, index: i64) -> String {
    pattern.replace("{index}", &index.to_string())
}
