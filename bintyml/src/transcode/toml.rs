//! TOML output: render a TYML value as a TOML document.
//!
//! Mapping:
//!   - Object        -> TOML table (source key order, last duplicate wins)
//!   - String        -> TOML string
//!   - Number        -> TOML integer if it fits in i64, otherwise TOML float
//!                      when it has a fraction or exponent
//!
//! Lossy edges:
//!   - TOML requires the top-level value to be a table; a bare string or
//!     number document is an error.
//!   - TOML integers are i64; larger integer literals are an error.

use super::Number;
use libtyml::Value;
use toml_edit::DocumentMut;

/// Encode a TYML Value as a TOML string.
pub fn encode(value: &Value) -> Result<String, String> {
    match value_to_toml(value)? {
        toml_edit::Item::Table(table) => {
            let mut doc = DocumentMut::new();
            for (key, item) in table.iter() {
                doc[key] = item.clone();
            }
            Ok(doc.to_string())
        }
        _ => Err(format!(
            "TOML requires the top-level value to be a table/object, found {}",
            value.kind_name()
        )),
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Item, String> {
    match value {
        Value::String(s) => Ok(toml_edit::Item::Value(toml_edit::Value::String(
            toml_edit::Formatted::new(s.value.clone()),
        ))),
        Value::Number(n) => {
            let v = match Number::from_literal(&n.value)? {
                Number::Int(i) => toml_edit::Value::Integer(toml_edit::Formatted::new(i)),
                Number::Float(f) => toml_edit::Value::Float(toml_edit::Formatted::new(f)),
                Number::UInt(_) | Number::Big(_) => {
                    return Err(format!(
                        "Integer {} too large for TOML (i64) at {}",
                        n.value, n.token.position
                    ))
                }
            };
            Ok(toml_edit::Item::Value(v))
        }
        Value::Object(obj) => {
            let mut table = toml_edit::Table::new();
            for pair in obj {
                table.insert(pair.key.name(), value_to_toml(&pair.value)?);
            }
            Ok(toml_edit::Item::Table(table))
        }
    }
}
