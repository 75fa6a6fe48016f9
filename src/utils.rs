//! Lenient field decoding for request bodies.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer};

/// Decode a numeric field sent either as a JSON number or as a numeric string.
///
/// Browser forms submit `"10.99"` where API callers send `10.99`; both decode to
/// the same value. Surrounding whitespace in the string form is ignored.
pub fn string_or_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber<T> {
        String(String),
        Number(T),
    }

    match StringOrNumber::<T>::deserialize(deserializer)? {
        StringOrNumber::String(raw) => T::from_str(raw.trim()).map_err(|err| {
            de::Error::custom(format!("cannot parse '{}' as a number: {}", raw, err))
        }),
        StringOrNumber::Number(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Quantity {
        #[serde(deserialize_with = "string_or_number")]
        count: i64,
        #[serde(deserialize_with = "string_or_number")]
        amount: f64,
    }

    #[test]
    fn numbers_and_numeric_strings_decode_alike() {
        let plain: Quantity = serde_json::from_value(json!({ "count": 5, "amount": 10 })).unwrap();
        let text: Quantity =
            serde_json::from_value(json!({ "count": " 5 ", "amount": "10.0" })).unwrap();

        assert_eq!((plain.count, plain.amount), (5, 10.0));
        assert_eq!((text.count, text.amount), (5, 10.0));
    }

    #[test]
    fn negative_strings_are_kept_for_validation() {
        let parsed: Quantity =
            serde_json::from_value(json!({ "count": "-2", "amount": "-1.5" })).unwrap();
        assert_eq!((parsed.count, parsed.amount), (-2, -1.5));
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let err = serde_json::from_value::<Quantity>(json!({ "count": "five", "amount": 1 }))
            .unwrap_err();
        assert!(err.to_string().contains("cannot parse 'five'"));
    }

    #[test]
    fn other_json_types_are_rejected() {
        assert!(serde_json::from_value::<Quantity>(json!({ "count": true, "amount": 1 })).is_err());
    }
}
