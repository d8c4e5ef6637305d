//! Attribute naming across the store boundary.
//!
//! Records use camelCase attributes; table columns use snake_case, and a few
//! columns carry historical names. [`COLUMNS`] pins those; every other
//! attribute goes through the generic case transform.

use serde_json::{Map, Value};

/// `(attribute, column)` pairs that do not follow the generic transform.
pub const COLUMNS: &[(&str, &str)] = &[
    ("photoRef", "photo_url"),
    ("receiptRef", "receipt_url"),
    ("recurrence", "recurring_type"),
    ("builtinKey", "building_block"),
    ("enabled", "is_enabled"),
];

/// Column name for a record attribute.
pub fn to_column(attribute: &str) -> String {
    COLUMNS
        .iter()
        .find(|(from, _)| *from == attribute)
        .map_or_else(|| camel_to_snake(attribute), |(_, to)| (*to).to_string())
}

/// Record attribute for a column name.
pub fn to_attribute(column: &str) -> String {
    COLUMNS
        .iter()
        .find(|(_, to)| *to == column)
        .map_or_else(|| snake_to_camel(column), |(from, _)| (*from).to_string())
}

/// Rename the keys of a JSON object from attributes to columns.
///
/// Non-object values are returned unchanged; nested values are left alone.
pub fn to_row(value: Value) -> Value {
    rename_keys(value, to_column)
}

/// Rename the keys of a JSON object from columns to attributes.
pub fn to_record(value: Value) -> Value {
    rename_keys(value, to_attribute)
}

fn rename_keys(value: Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (rename(&key), value))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

fn camel_to_snake(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for c in input.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn snake_to_camel(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper = false;
    for c in input.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
