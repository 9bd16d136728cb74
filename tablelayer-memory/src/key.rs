//! Hashable, normalized primary key and join key values.

use std::fmt;

use bson::{Bson, DateTime};

/// A scalar [`Bson`] value normalized for hashing.
///
/// Integral numbers collapse to [`KeyValue::Integer`] whatever their BSON type, so `1`,
/// `1_i64` and `1.0` are the same key. Null, NaN, arrays, documents and other BSON types
/// are not keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Bool(bool),
    Integer(i64),
    /// Bit pattern of a non-integral, non-NaN double.
    Double(u64),
    String(String),
    DateTime(i64),
}

impl KeyValue {
    /// Normalizes a value, returning `None` if it cannot be used as a key.
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Boolean(value) => Some(KeyValue::Bool(*value)),
            Bson::Int32(value) => Some(KeyValue::Integer(i64::from(*value))),
            Bson::Int64(value) => Some(KeyValue::Integer(*value)),
            Bson::Double(value) => Self::from_f64(*value),
            Bson::String(value) => Some(KeyValue::String(value.clone())),
            Bson::DateTime(value) => Some(KeyValue::DateTime(value.timestamp_millis())),
            _ => None,
        }
    }

    fn from_f64(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }

        // i64::MAX as f64 rounds up to 2^63, which is out of range
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Some(KeyValue::Integer(value as i64))
        } else {
            Some(KeyValue::Double(value.to_bits()))
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Bool(value) => write!(f, "{value}"),
            KeyValue::Integer(value) => write!(f, "{value}"),
            KeyValue::Double(bits) => write!(f, "{}", f64::from_bits(*bits)),
            KeyValue::String(value) => write!(f, "{value:?}"),
            KeyValue::DateTime(millis) => write!(f, "{}", DateTime::from_millis(*millis)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn integral_numbers_share_one_key() {
        let expected = Some(KeyValue::Integer(42));

        assert_eq!(KeyValue::from_bson(&Bson::Int32(42)), expected);
        assert_eq!(KeyValue::from_bson(&Bson::Int64(42)), expected);
        assert_eq!(KeyValue::from_bson(&Bson::Double(42.0)), expected);
        assert_eq!(KeyValue::from_bson(&Bson::Double(-0.0)), Some(KeyValue::Integer(0)));
    }

    #[test]
    fn fractional_doubles_keep_their_bits() {
        assert_eq!(
            KeyValue::from_bson(&Bson::Double(2.5)),
            Some(KeyValue::Double(2.5_f64.to_bits()))
        );
        assert!(matches!(KeyValue::from_bson(&Bson::Double(1e300)), Some(KeyValue::Double(_))));
        assert_eq!(KeyValue::Double(2.5_f64.to_bits()).to_string(), "2.5");
    }

    #[test]
    fn non_scalar_values_are_not_keys() {
        assert_eq!(KeyValue::from_bson(&Bson::Null), None);
        assert_eq!(KeyValue::from_bson(&Bson::Double(f64::NAN)), None);
        assert_eq!(KeyValue::from_bson(&Bson::Array(vec![Bson::Int32(1)])), None);
        assert_eq!(KeyValue::from_bson(&Bson::Document(doc! { "a": 1 })), None);
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(KeyValue::Integer(7).to_string(), "7");
        assert_eq!(KeyValue::String("GB".to_string()).to_string(), "\"GB\"");
        assert_eq!(KeyValue::Bool(true).to_string(), "true");
    }
}
