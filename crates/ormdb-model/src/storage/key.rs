//! Primary key encoding.
//!
//! Key format: `[tag (1 byte)][payload]`
//!
//! Integers are stored big-endian with the sign bit flipped so that
//! lexicographic ordering matches numeric ordering. Strings are stored as raw
//! UTF-8 after their tag.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Error;
use crate::value::Value;

const INT_TAG: u8 = 0x01;
const STRING_TAG: u8 = 0x02;
const SIGN_BIT: u64 = 1 << 63;

/// Encode a primary key value.
pub fn encode_key(value: &Value) -> Result<Vec<u8>, Error> {
    match value {
        Value::Int(i) => {
            let mut buf = Vec::with_capacity(9);
            buf.push(INT_TAG);
            buf.extend_from_slice(&((*i as u64) ^ SIGN_BIT).to_be_bytes());
            Ok(buf)
        }
        Value::String(s) => {
            let mut buf = Vec::with_capacity(1 + s.len());
            buf.push(STRING_TAG);
            buf.extend_from_slice(s.as_bytes());
            Ok(buf)
        }
        other => Err(Error::InvalidKey(format!(
            "{} values cannot be used as keys",
            other.kind()
        ))),
    }
}

/// Get the current timestamp in microseconds since Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_ordering() {
        let neg = encode_key(&Value::Int(-5)).unwrap();
        let zero = encode_key(&Value::Int(0)).unwrap();
        let small = encode_key(&Value::Int(2)).unwrap();
        let large = encode_key(&Value::Int(300)).unwrap();

        assert!(neg < zero);
        assert!(zero < small);
        assert!(small < large);
    }

    #[test]
    fn test_string_keys_are_tagged() {
        let key = encode_key(&Value::from("FR")).unwrap();
        assert_eq!(key, vec![0x02, b'F', b'R']);
        assert_ne!(
            encode_key(&Value::from("1")).unwrap(),
            encode_key(&Value::Int(1)).unwrap()
        );
    }

    #[test]
    fn test_invalid_key_values() {
        assert!(matches!(
            encode_key(&Value::Null),
            Err(Error::InvalidKey(_))
        ));
        assert!(encode_key(&Value::Float(1.0)).is_err());
    }
}
