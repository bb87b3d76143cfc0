//! Field tag resolution.
//!
//! A tag is a comma-separated directive set attached to a record field:
//!
//! - `pk` marks the primary key
//! - `column:<name>` overrides the column name
//!
//! Directives can be combined (`"pk,column:user_id"`). Unknown directives are
//! ignored. Without a `column` directive the column is the lower-cased field name.

/// Resolved column metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTag {
    pub column: String,
    pub primary_key: bool,
}

/// Resolve a field's column name and primary-key flag from its optional tag.
pub fn resolve(field_name: &str, tag: Option<&str>) -> ColumnTag {
    let mut column = None;
    let mut primary_key = false;

    for directive in tag.unwrap_or_default().split(',').map(str::trim) {
        if directive == "pk" {
            primary_key = true;
        } else if let Some(name) = directive.strip_prefix("column:") {
            let name = name.trim();
            if !name.is_empty() {
                column = Some(name.to_string());
            }
        }
    }

    ColumnTag {
        column: column.unwrap_or_else(|| field_name.to_lowercase()),
        primary_key,
    }
}
