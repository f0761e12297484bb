//! CBOR output: encode a TYML value as CBOR bytes.
//!
//! Mapping:
//!   - Object  -> CBOR map (text string keys, source order, last duplicate
//!                wins)
//!   - String  -> CBOR text string
//!   - Number  -> CBOR integer when the literal is an integer in CBOR's
//!                native range, CBOR float otherwise
//!
//! Integers that exceed CBOR's native integer range produce an error rather
//! than using bignum tags.

use super::Number;
use ciborium::value::{Integer, Value as CborValue};
use libtyml::Value;

/// Encode a TYML Value as CBOR bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, String> {
    let cbor_value = value_to_cbor(value)?;
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&cbor_value, &mut buf)
        .map_err(|e| format!("CBOR encode error: {}", e))?;
    Ok(buf)
}

fn value_to_cbor(value: &Value) -> Result<CborValue, String> {
    match value {
        Value::String(s) => Ok(CborValue::Text(s.value.clone())),
        Value::Number(n) => match Number::from_literal(&n.value)? {
            Number::Int(i) => Ok(CborValue::Integer(Integer::from(i))),
            Number::UInt(u) => Ok(CborValue::Integer(Integer::from(u))),
            Number::Float(f) => Ok(CborValue::Float(f)),
            Number::Big(b) => Err(format!(
                "Integer {} exceeds CBOR's native integer range at {}",
                b, n.token.position
            )),
        },
        Value::Object(obj) => {
            let mut entries: Vec<(CborValue, CborValue)> = Vec::with_capacity(obj.len());
            for pair in obj {
                let key = CborValue::Text(pair.key.name().to_string());
                let value = value_to_cbor(&pair.value)?;
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
            }
            Ok(CborValue::Map(entries))
        }
    }
}
