//! YAML output: render a TYML value as YAML text.
//!
//! Mapping:
//!   - Object        -> YAML mapping (source key order, last duplicate wins)
//!   - String        -> YAML string
//!   - Number        -> YAML integer if it fits in i64/u64, float if it has
//!                      a fraction or exponent, otherwise a string
//!
//! YAML has no arbitrary-precision integers, so big literals are emitted as
//! strings rather than losing digits.

use super::Number;
use libtyml::Value;

/// Encode a TYML Value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value)?;
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> Result<serde_yaml::Value, String> {
    match value {
        Value::String(s) => Ok(serde_yaml::Value::String(s.value.clone())),
        Value::Number(n) => Ok(match Number::from_literal(&n.value)? {
            Number::Int(i) => serde_yaml::Value::Number(serde_yaml::Number::from(i)),
            Number::UInt(u) => serde_yaml::Value::Number(serde_yaml::Number::from(u)),
            Number::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(f)),
            Number::Big(b) => serde_yaml::Value::String(b.to_string()),
        }),
        Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for pair in obj {
                // Re-inserting a key replaces the value in place
                map.insert(
                    serde_yaml::Value::String(pair.key.name().to_string()),
                    value_to_yaml(&pair.value)?,
                );
            }
            Ok(serde_yaml::Value::Mapping(map))
        }
    }
}
