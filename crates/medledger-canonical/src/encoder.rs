//! Tagged, length-prefixed canonical encoding.
//!
//! Layout rules (encoding version 1):
//!
//! - every encoding starts with a NUL-terminated domain separator
//! - every value is preceded by a one-byte type tag
//! - lengths and counts are `u64` big-endian
//! - object members are emitted in ascending key byte order
//! - integral floats that fit an integer type are emitted as that integer,
//!   so `1`, `1.0` and `1e0` produce identical bytes
//!
//! The same bytes are used by external signers, by signature verification and
//! (for blocks) by hash linkage.

use serde_json::Value;

/// Domain separator for the co-signed transaction message: `b"medledger:tx:v1\0"`.
pub const TRANSACTION_DOMAIN: &[u8] = b"medledger:tx:v1\0";

/// Domain separator for block hashing: `b"medledger:block:v1\0"`.
pub const BLOCK_DOMAIN: &[u8] = b"medledger:block:v1\0";

/// One-byte type tags.
pub mod tag {
    /// JSON `null`, also the genesis data marker.
    pub const NULL: u8 = 0x00;
    /// JSON `false`, also the transaction data marker.
    pub const FALSE: u8 = 0x01;
    /// JSON `true`.
    pub const TRUE: u8 = 0x02;
    /// Signed 64-bit integer.
    pub const INT: u8 = 0x03;
    /// Unsigned 64-bit integer above `i64::MAX`.
    pub const UINT: u8 = 0x04;
    /// IEEE-754 double, raw bits.
    pub const FLOAT: u8 = 0x05;
    /// UTF-8 string.
    pub const STRING: u8 = 0x06;
    /// Array of values.
    pub const ARRAY: u8 = 0x07;
    /// Object with members sorted by key.
    pub const OBJECT: u8 = 0x08;
    /// Opaque byte string (signatures).
    pub const BYTES: u8 = 0x09;
}

/// 2^63 and 2^64 as exact doubles.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Streaming canonical encoder.
///
/// Callers push fields in their fixed order and call [`finish`](Self::finish).
/// Encoding never fails.
#[derive(Debug, Clone)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    /// Starts an encoding under the given domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(domain);
        Self { buf }
    }

    /// Starts a transaction-message encoding.
    pub fn transaction() -> Self {
        Self::new(TRANSACTION_DOMAIN)
    }

    /// Starts a block encoding.
    pub fn block() -> Self {
        Self::new(BLOCK_DOMAIN)
    }

    /// Emits a bare tag byte (used for enum discriminants).
    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.buf.push(tag);
        self
    }

    /// Emits an unsigned integer.
    pub fn u64(&mut self, value: u64) -> &mut Self {
        if let Ok(signed) = i64::try_from(value) {
            return self.i64(signed);
        }
        self.buf.push(tag::UINT);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Emits a signed integer.
    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.buf.push(tag::INT);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Emits a float, collapsing integral values to integers.
    pub fn f64(&mut self, value: f64) -> &mut Self {
        if value.is_finite() && value.fract() == 0.0 {
            if (-TWO_POW_63..TWO_POW_63).contains(&value) {
                return self.i64(value as i64);
            }
            if (0.0..TWO_POW_64).contains(&value) {
                return self.u64(value as u64);
            }
        }
        self.buf.push(tag::FLOAT);
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
        self
    }

    /// Emits a UTF-8 string.
    pub fn str(&mut self, value: &str) -> &mut Self {
        self.buf.push(tag::STRING);
        self.len(value.len());
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Emits an opaque byte string.
    pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.push(tag::BYTES);
        self.len(value.len());
        self.buf.extend_from_slice(value);
        self
    }

    /// Emits a JSON value recursively.
    pub fn value(&mut self, value: &Value) -> &mut Self {
        match value {
            Value::Null => self.tag(tag::NULL),
            Value::Bool(false) => self.tag(tag::FALSE),
            Value::Bool(true) => self.tag(tag::TRUE),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.i64(i)
                } else if let Some(u) = n.as_u64() {
                    self.u64(u)
                } else {
                    // serde_json numbers are always representable as f64
                    self.f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => self.str(s),
            Value::Array(items) => {
                self.buf.push(tag::ARRAY);
                self.len(items.len());
                for item in items {
                    self.value(item);
                }
                self
            }
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
                self.buf.push(tag::OBJECT);
                self.len(entries.len());
                for (key, child) in entries {
                    self.str(key);
                    self.value(child);
                }
                self
            }
        }
    }

    /// Returns the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn len(&mut self, len: usize) {
        self.buf.extend_from_slice(&(len as u64).to_be_bytes());
    }
}

/// Encodes the message both co-signers sign: `{patient_id, hospital_id, payload}`.
///
/// Signatures are never part of their own message.
pub fn encode_transaction_message(patient_id: &str, hospital_id: &str, payload: &Value) -> Vec<u8> {
    let mut enc = CanonicalEncoder::transaction();
    enc.str(patient_id).str(hospital_id).value(payload);
    enc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_is_tagged_and_length_prefixed() {
        let mut enc = CanonicalEncoder::new(b"");
        enc.str("ab");
        assert_eq!(enc.finish(), vec![tag::STRING, 0, 0, 0, 0, 0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn negative_zero_encodes_as_integer_zero() {
        let mut a = CanonicalEncoder::new(b"");
        a.f64(-0.0);
        let mut b = CanonicalEncoder::new(b"");
        b.i64(0);
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn large_integral_float_matches_unsigned_form() {
        let mut a = CanonicalEncoder::new(b"");
        a.f64(TWO_POW_63);
        let mut b = CanonicalEncoder::new(b"");
        b.u64(1u64 << 63);
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn fractional_float_keeps_its_bits() {
        let mut enc = CanonicalEncoder::new(b"");
        enc.f64(1.5);
        let mut expected = vec![tag::FLOAT];
        expected.extend_from_slice(&1.5f64.to_bits().to_be_bytes());
        assert_eq!(enc.finish(), expected);
    }

    #[test]
    fn message_starts_with_transaction_domain() {
        let bytes = encode_transaction_message("p1", "h1", &json!("X"));
        assert!(bytes.starts_with(TRANSACTION_DOMAIN));
    }

    #[test]
    fn nested_objects_are_sorted_at_every_level() {
        let a = encode_transaction_message("p", "h", &json!({"z": {"b": 1, "a": 2}, "y": [1, 2]}));
        let b = encode_transaction_message("p", "h", &json!({"y": [1, 2], "z": {"a": 2, "b": 1}}));
        assert_eq!(a, b);
    }
}
