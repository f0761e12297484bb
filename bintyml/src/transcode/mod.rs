//! Output formats for parsed TYML documents.
//!
//! TYML numbers are kept as their source text. Every target format needs a
//! concrete numeric type, so the literal is classified once here.

pub mod cbor;
pub mod toml;
pub mod tree;
pub mod yaml;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// A number literal resolved to the narrowest type that holds it.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    /// Integer literal outside the 64-bit range.
    Big(BigInt),
    Float(f64),
}

impl Number {
    /// Classify a literal produced by the tokenizer. Literals with a
    /// fraction or exponent are floats; the rest are integers.
    pub fn from_literal(literal: &str) -> Result<Number, String> {
        if literal.contains(['.', 'e', 'E']) {
            return literal
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|e| format!("Invalid number {}: {}", literal, e));
        }
        let n: BigInt = literal
            .parse()
            .map_err(|e| format!("Invalid number {}: {}", literal, e))?;
        Ok(if let Some(i) = n.to_i64() {
            Number::Int(i)
        } else if let Some(u) = n.to_u64() {
            Number::UInt(u)
        } else {
            Number::Big(n)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literals() {
        assert_eq!(Number::from_literal("42"), Ok(Number::Int(42)));
        assert_eq!(
            Number::from_literal("18446744073709551615"),
            Ok(Number::UInt(u64::MAX))
        );
        assert_eq!(Number::from_literal("2.5"), Ok(Number::Float(2.5)));
        assert_eq!(Number::from_literal("1e3"), Ok(Number::Float(1000.0)));
        assert!(matches!(
            Number::from_literal("123456789012345678901234567890"),
            Ok(Number::Big(_))
        ));
    }
}
