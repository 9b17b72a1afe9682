//! Payload codec shared by the signer and the transport executor.
//!
//! Both sides call the same functions so the signed bytes and the transmitted
//! bytes cannot diverge.

use crate::core::errors::FtxError;
use crate::core::types::HttpMethod;
use rust_decimal::Decimal;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// A single request field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Null,
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    /// Query-string form. `Null` has none and is omitted from queries.
    fn to_query_value(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Str(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

// Decimals always travel as strings to avoid float rounding in the signature
impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamValueVisitor;

        impl Visitor<'_> for ParamValueVisitor {
            type Value = ParamValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, integer, boolean or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ParamValue::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(ParamValue::Str(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ParamValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(ParamValue::Int)
                    .map_err(|_| E::custom(format!("integer {} out of range", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Err(E::custom(format!(
                    "floating-point value {} not accepted, use a decimal string",
                    v
                )))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(ParamValue::Bool(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ParamValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ParamValue::Null)
            }
        }

        deserializer.deserialize_any(ParamValueVisitor)
    }
}

/// Ordered field list for a query string or a request body.
///
/// Fields serialize in exactly the order they were added, so every call site
/// that builds the same request produces the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    fields: Vec<(Cow<'static, str>, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn with(mut self, key: &'static str, value: impl Into<ParamValue>) -> Self {
        self.fields.push((Cow::Borrowed(key), value.into()));
        self
    }

    /// Append a field only when a value is present
    pub fn with_opt<V: Into<ParamValue>>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Append a field that is sent as JSON `null` when absent
    pub fn with_nullable<V: Into<ParamValue>>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self.with(key, ParamValue::Null),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_ref()).collect()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key.as_ref(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = Params;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of request fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, ParamValue>()? {
                    fields.push((Cow::Owned(key), value));
                }
                Ok(Params { fields })
            }
        }

        deserializer.deserialize_map(ParamsVisitor)
    }
}

/// Compact JSON for a request body (`,` and `:` separators, no whitespace).
/// An empty field list means "no body".
pub fn encode_body(body: &Params) -> Result<Option<String>, FtxError> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(body)
        .map(Some)
        .map_err(|e| FtxError::SerializationError(format!("Failed to encode body: {}", e)))
}

/// The body that is both signed and transmitted for a request.
///
/// GET never carries a body, whatever the caller supplied.
pub fn request_payload(method: HttpMethod, body: &Params) -> Result<Option<String>, FtxError> {
    if method.carries_body() {
        encode_body(body)
    } else {
        Ok(None)
    }
}

/// URL query suffix including the leading `?`, or an empty string when there
/// are no parameters
pub fn encode_query(query: &Params) -> Result<String, FtxError> {
    let pairs: Vec<(&str, String)> = query
        .iter()
        .filter_map(|(k, v)| v.to_query_value().map(|v| (k, v)))
        .collect();

    if pairs.is_empty() {
        return Ok(String::new());
    }

    serde_urlencoded::to_string(&pairs)
        .map(|encoded| format!("?{}", encoded))
        .map_err(|e| FtxError::SerializationError(format!("Failed to encode query: {}", e)))
}

pub fn decode_body(body: &str) -> Result<Params, FtxError> {
    if body.is_empty() {
        return Ok(Params::new());
    }
    serde_json::from_str(body).map_err(|source| FtxError::DecodeError {
        body: body.to_string(),
        source,
    })
}

/// Parse a query string (with or without the leading `?`). Values come back as strings.
pub fn decode_query(query: &str) -> Result<Params, FtxError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| FtxError::InvalidParameters(format!("Failed to decode query: {}", e)))?;

    Ok(Params {
        fields: pairs
            .into_iter()
            .map(|(k, v)| (Cow::Owned(k), ParamValue::Str(v)))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn order_body() -> Params {
        Params::new()
            .with("market", "BTC-PERP")
            .with("side", "buy")
            .with("price", Decimal::from_str("10000.5").unwrap())
            .with("ioc", false)
            .with("leverage", 5_i64)
    }

    #[test]
    fn test_body_is_compact_and_ordered() {
        let encoded = encode_body(&order_body()).unwrap().unwrap();
        assert_eq!(
            encoded,
            r#"{"market":"BTC-PERP","side":"buy","price":"10000.5","ioc":false,"leverage":5}"#
        );
    }

    #[test]
    fn test_empty_body_is_no_body() {
        assert_eq!(encode_body(&Params::new()).unwrap(), None);
    }

    #[test]
    fn test_get_never_has_payload() {
        let body = order_body();
        assert_eq!(request_payload(HttpMethod::Get, &body).unwrap(), None);
        assert!(request_payload(HttpMethod::Post, &body).unwrap().is_some());
        assert!(request_payload(HttpMethod::Delete, &body).unwrap().is_some());
        assert_eq!(request_payload(HttpMethod::Delete, &Params::new()).unwrap(), None);
    }

    #[test]
    fn test_body_round_trip_preserves_order() {
        let body = order_body().with_nullable::<Decimal>("trailValue", None);
        let encoded = encode_body(&body).unwrap().unwrap();
        let decoded = decode_body(&encoded).unwrap();

        assert_eq!(decoded, body);
        assert_eq!(
            decoded.keys(),
            vec!["market", "side", "price", "ioc", "leverage", "trailValue"]
        );
    }

    #[test]
    fn test_decode_body_rejects_floats() {
        assert!(decode_body(r#"{"price":1.5}"#).is_err());
    }

    #[test]
    fn test_decode_body_malformed() {
        let err = decode_body("{not json").unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_query_encoding() {
        let query = Params::new()
            .with("resolution", 60_u32)
            .with("market", "BTC/USD")
            .with("showAvgPrice", true);
        assert_eq!(
            encode_query(&query).unwrap(),
            "?resolution=60&market=BTC%2FUSD&showAvgPrice=true"
        );
    }

    #[test]
    fn test_empty_query_has_no_suffix() {
        assert_eq!(encode_query(&Params::new()).unwrap(), "");
        let only_null = Params::new().with("price", ParamValue::Null);
        assert_eq!(encode_query(&only_null).unwrap(), "");
    }

    #[test]
    fn test_query_round_trip() {
        let query = Params::new()
            .with("market", "BTC-PERP")
            .with("side", "sell")
            .with("start_time", "1600000000");
        let encoded = encode_query(&query).unwrap();
        assert_eq!(decode_query(&encoded).unwrap(), query);
        assert!(decode_query("").unwrap().is_empty());
    }

    #[test]
    fn test_with_opt_skips_missing() {
        let params = Params::new()
            .with_opt::<&str>("market", None)
            .with_opt("side", Some("buy"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("side"), Some(&ParamValue::Str("buy".to_string())));
        assert_eq!(params.get("market"), None);
    }
}
