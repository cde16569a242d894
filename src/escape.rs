//! Escaping of values and identifiers for interpolation into SQL text.
//!
//! Every statement assembled by the CRUD helpers passes each table name, column name and
//! value through this module; nothing is concatenated raw.

use std::fmt::Write;

use serde_json::Value as JsonValue;

use crate::types::{Dialect, Value};

/// Escape `text` so it can sit between single quotes in a statement.
#[must_use]
pub fn escape_str(text: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    match dialect {
        Dialect::MySql => {
            for ch in text.chars() {
                match ch {
                    '\0' => out.push_str("\\0"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '"' => out.push_str("\\\""),
                    '\u{1a}' => out.push_str("\\Z"),
                    other => out.push(other),
                }
            }
        }
        Dialect::Sqlite => {
            for ch in text.chars() {
                match ch {
                    // sqlite stops reading statement text at NUL
                    '\0' => {}
                    '\'' => out.push_str("''"),
                    other => out.push(other),
                }
            }
        }
    }
    out
}

/// Render a value as a complete SQL literal: `'text'`, `NULL`, or `X'..'` for blobs.
#[must_use]
pub fn literal(value: &Value, dialect: Dialect) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Blob(bytes) => {
            let mut out = String::with_capacity(bytes.len() * 2 + 3);
            out.push_str("X'");
            for b in bytes {
                let _ = write!(out, "{b:02X}");
            }
            out.push('\'');
            out
        }
        other => {
            let text = other.to_sql_text().unwrap_or_default();
            format!("'{}'", escape_str(&text, dialect))
        }
    }
}

/// Quote a single identifier (a column or database name) with back-ticks, doubling
/// embedded back-ticks. Dots are part of the name.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| *c != '\0').collect();
    format!("`{}`", cleaned.replace('`', "``"))
}

/// Quote a table name; a dotted name such as `crm.contacts` is quoted segment by segment.
#[must_use]
pub fn identifier(name: &str) -> String {
    name.split('.').map(quote_ident).collect::<Vec<_>>().join(".")
}

/// Escape every string inside a nested JSON structure, keeping its shape.
#[must_use]
pub fn escape_all(data: &JsonValue, dialect: Dialect) -> JsonValue {
    match data {
        JsonValue::String(s) => JsonValue::String(escape_str(s, dialect)),
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(|v| escape_all(v, dialect)).collect())
        }
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), escape_all(v, dialect)))
                .collect(),
        ),
        other => other.clone(),
    }
}
