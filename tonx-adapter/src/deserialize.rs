use std::fmt::Display;
use std::str::FromStr;
use serde::{Deserialize, Deserializer};

pub fn deserialize_number_from_string<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + serde::Deserialize<'de>,
        <T as FromStr>::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt<T> {
        String(String),
        Number(T),
    }

    match StringOrInt::<T>::deserialize(deserializer)? {
        StringOrInt::String(s) => s.parse::<T>().map_err(serde::de::Error::custom),
        StringOrInt::Number(i) => Ok(i),
    }
}

/// Upstream sends lts and balances either as JSON numbers or strings; keep
/// them as decimal strings without going through a lossy float.
pub fn deserialize_decimal_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where D: Deserializer<'de>
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => s,
        StringOrInt::Unsigned(n) => n.to_string(),
        StringOrInt::Signed(n) => n.to_string(),
    })
}

pub fn deserialize_optional_decimal_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where D: Deserializer<'de>
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_decimal_string")] String);

    let v = Option::<Wrapper>::deserialize(deserializer)?;

    Ok(v.map(|Wrapper(s)| s).filter(|s| !s.is_empty()))
}

pub fn deserialize_default_as_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where D: Deserializer<'de>,
          T : Default + serde::Deserialize<'de> + PartialEq
{
    let v = Option::<T>::deserialize(deserializer)?;

    Ok(v.filter(|v| v != &T::default()))
}

pub fn deserialize_empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where D: Deserializer<'de>
{
    let v = Option::<String>::deserialize(deserializer)?;

    Ok(v.filter(|s| !s.is_empty()))
}

pub mod display_string {
    use std::fmt::Display;
    use std::str::FromStr;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
        where T: Display,
              S: Serializer
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
        where T: FromStr,
              T::Err: Display,
              D: Deserializer<'de>
    {
        let s = String::deserialize(deserializer)?;

        T::from_str(&s).map_err(de::Error::custom)
    }
}

pub mod bytes_base64 {
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error> where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;

        base64::engine::general_purpose::STANDARD.decode(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use crate::deserialize::{deserialize_decimal_string, deserialize_default_as_none, deserialize_number_from_string, deserialize_optional_decimal_string};

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "deserialize_number_from_string")]
        seqno: u32,
        #[serde(deserialize_with = "deserialize_decimal_string")]
        lt: String,
        #[serde(default, deserialize_with = "deserialize_optional_decimal_string")]
        created_lt: Option<String>,
        #[serde(default, deserialize_with = "deserialize_default_as_none")]
        code: Option<String>,
    }

    #[test]
    fn number_from_string_or_number() {
        let a: Sample = serde_json::from_value(json!({"seqno": "12", "lt": 47000000000001u64})).unwrap();
        let b: Sample = serde_json::from_value(json!({"seqno": 12, "lt": "47000000000001"})).unwrap();

        assert_eq!(a.seqno, b.seqno);
        assert_eq!(a.lt, b.lt);
    }

    #[test]
    fn number_from_string_rejects_words() {
        assert!(serde_json::from_value::<Sample>(json!({"seqno": "not-a-number", "lt": "1"})).is_err());
    }

    #[test]
    fn empty_values_are_none() {
        let sample: Sample = serde_json::from_value(json!({"seqno": 1, "lt": "1", "created_lt": "", "code": ""})).unwrap();

        assert_eq!(sample.created_lt, None);
        assert_eq!(sample.code, None);

        let sample: Sample = serde_json::from_value(json!({"seqno": 1, "lt": "1", "created_lt": null, "code": null})).unwrap();

        assert_eq!(sample.created_lt, None);
        assert_eq!(sample.code, None);
    }
}
