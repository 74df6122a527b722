//! Self-describing configuration values
//!
//! [`ConfigurationValue`] is the common currency between the manifest process
//! and the tool. It maps onto JSON with primitive types kept distinct: an
//! integer never comes back as a float, a string never comes back as a number.

use crate::errors::CodecError;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Sequence(Vec<ConfigurationValue>),
    Mapping(BTreeMap<String, ConfigurationValue>),
}

impl ConfigurationValue {
    /// Name of the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigurationValue::Integer(_) => "integer",
            ConfigurationValue::Float(_) => "float",
            ConfigurationValue::Boolean(_) => "boolean",
            ConfigurationValue::Text(_) => "text",
            ConfigurationValue::Sequence(_) => "sequence",
            ConfigurationValue::Mapping(_) => "mapping",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigurationValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigurationValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigurationValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigurationValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigurationValue]> {
        match self {
            ConfigurationValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, ConfigurationValue>> {
        match self {
            ConfigurationValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when this value is a mapping
    pub fn get(&self, key: &str) -> Option<&ConfigurationValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Decode a JSON value.
    ///
    /// Candidates are tried in a fixed order: integer, text, boolean, float,
    /// sequence, mapping. `null` and integers outside the `i64` range have no
    /// representation and fail with [`CodecError::UnsupportedValue`].
    pub fn from_json(json: &Value) -> Result<Self, CodecError> {
        decode_at(json, "$")
    }

    /// Encode into a JSON value; non-finite floats fail.
    pub fn to_json(&self) -> Result<Value, CodecError> {
        encode_at(self, "$")
    }
}

fn decode_at(json: &Value, path: &str) -> Result<ConfigurationValue, CodecError> {
    if let Some(i) = json.as_i64() {
        return Ok(ConfigurationValue::Integer(i));
    }
    if let Some(s) = json.as_str() {
        return Ok(ConfigurationValue::Text(s.to_string()));
    }
    if let Some(b) = json.as_bool() {
        return Ok(ConfigurationValue::Boolean(b));
    }
    if let Value::Number(n) = json {
        if n.is_f64() {
            if let Some(f) = n.as_f64() {
                return Ok(ConfigurationValue::Float(f));
            }
        }
    }
    if let Some(items) = json.as_array() {
        return items
            .iter()
            .enumerate()
            .map(|(idx, item)| decode_at(item, &format!("{}[{}]", path, idx)))
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigurationValue::Sequence);
    }
    if let Some(object) = json.as_object() {
        return object
            .iter()
            .map(|(key, item)| {
                decode_at(item, &format!("{}.{}", path, key)).map(|v| (key.clone(), v))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(ConfigurationValue::Mapping);
    }

    let shape = match json {
        Value::Null => "null".to_string(),
        Value::Number(n) => format!("integer {} outside the 64-bit signed range", n),
        other => format!("{}", other),
    };
    Err(CodecError::UnsupportedValue {
        path: path.to_string(),
        shape,
    })
}

fn encode_at(value: &ConfigurationValue, path: &str) -> Result<Value, CodecError> {
    Ok(match value {
        ConfigurationValue::Integer(i) => Value::Number(Number::from(*i)),
        ConfigurationValue::Float(f) => {
            Value::Number(Number::from_f64(*f).ok_or_else(|| CodecError::UnsupportedValue {
                path: path.to_string(),
                shape: format!("non-finite float {}", f),
            })?)
        }
        ConfigurationValue::Boolean(b) => Value::Bool(*b),
        ConfigurationValue::Text(s) => Value::String(s.clone()),
        ConfigurationValue::Sequence(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| encode_at(item, &format!("{}[{}]", path, idx)))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        ConfigurationValue::Mapping(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    encode_at(item, &format!("{}.{}", path, key)).map(|v| (key.clone(), v))
                })
                .collect::<Result<Map<_, _>, _>>()?,
        ),
    })
}

impl Serialize for ConfigurationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigurationValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigurationValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            ConfigurationValue::Float(f) => Err(S::Error::custom(format!(
                "non-finite float {} cannot be encoded",
                f
            ))),
            ConfigurationValue::Boolean(b) => serializer.serialize_bool(*b),
            ConfigurationValue::Text(s) => serializer.serialize_str(s),
            ConfigurationValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigurationValue::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, item) in map {
                    out.serialize_entry(key, item)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConfigurationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Value::deserialize(deserializer)?;
        ConfigurationValue::from_json(&json).map_err(D::Error::custom)
    }
}

impl TryFrom<Value> for ConfigurationValue {
    type Error = CodecError;

    fn try_from(json: Value) -> Result<Self, Self::Error> {
        ConfigurationValue::from_json(&json)
    }
}

impl TryFrom<&ConfigurationValue> for Value {
    type Error = CodecError;

    fn try_from(value: &ConfigurationValue) -> Result<Self, Self::Error> {
        value.to_json()
    }
}

impl From<i64> for ConfigurationValue {
    fn from(value: i64) -> Self {
        ConfigurationValue::Integer(value)
    }
}

impl From<f64> for ConfigurationValue {
    fn from(value: f64) -> Self {
        ConfigurationValue::Float(value)
    }
}

impl From<bool> for ConfigurationValue {
    fn from(value: bool) -> Self {
        ConfigurationValue::Boolean(value)
    }
}

impl From<&str> for ConfigurationValue {
    fn from(value: &str) -> Self {
        ConfigurationValue::Text(value.to_string())
    }
}

impl From<String> for ConfigurationValue {
    fn from(value: String) -> Self {
        ConfigurationValue::Text(value)
    }
}

impl<T: Into<ConfigurationValue>> From<Vec<T>> for ConfigurationValue {
    fn from(values: Vec<T>) -> Self {
        ConfigurationValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ConfigurationValue>> for ConfigurationValue {
    fn from(map: BTreeMap<String, ConfigurationValue>) -> Self {
        ConfigurationValue::Mapping(map)
    }
}

/// Convert any serializable type into a configuration value.
///
/// `None` fields serialize to `null`, which has no representation; mark them
/// `#[serde(skip_serializing_if = "Option::is_none")]`.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<ConfigurationValue, CodecError> {
    let json = serde_json::to_value(value).map_err(|e| CodecError::Serialize(e.to_string()))?;
    ConfigurationValue::from_json(&json)
}

/// Rebuild a concrete type from a configuration value
pub fn from_value<T: DeserializeOwned>(value: &ConfigurationValue) -> Result<T, CodecError> {
    let json = value.to_json()?;
    serde_json::from_value(json).map_err(|e| CodecError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip(value: &ConfigurationValue) -> Option<ConfigurationValue> {
        let text = serde_json::to_string(value).ok()?;
        serde_json::from_str(&text).ok()
    }

    #[test]
    fn test_primitives_keep_their_type() {
        for value in [
            ConfigurationValue::Integer(-42),
            ConfigurationValue::Integer(i64::MAX),
            ConfigurationValue::Float(1.0),
            ConfigurationValue::Float(-0.25),
            ConfigurationValue::Boolean(true),
            ConfigurationValue::Text("42".to_string()),
            ConfigurationValue::Text(String::new()),
        ] {
            assert_eq!(round_trip(&value), Some(value.clone()), "{:?}", value);
        }
    }

    #[test]
    fn test_nested_round_trip() {
        let mut inner = BTreeMap::new();
        inner.insert("depth".to_string(), ConfigurationValue::Integer(3));
        inner.insert(
            "tags".to_string(),
            ConfigurationValue::from(vec!["a", "b"]),
        );

        let mut middle = BTreeMap::new();
        middle.insert(
            "levels".to_string(),
            ConfigurationValue::Sequence(vec![
                ConfigurationValue::Mapping(inner),
                ConfigurationValue::Float(2.5),
                ConfigurationValue::Sequence(vec![ConfigurationValue::Boolean(false)]),
            ]),
        );

        let mut outer = BTreeMap::new();
        outer.insert("middle".to_string(), ConfigurationValue::Mapping(middle));
        outer.insert("name".to_string(), ConfigurationValue::from("root"));
        let value = ConfigurationValue::Mapping(outer);

        assert_eq!(round_trip(&value), Some(value));
    }

    #[test]
    fn test_decode_priority() {
        assert_eq!(
            ConfigurationValue::from_json(&json!(7)).ok(),
            Some(ConfigurationValue::Integer(7))
        );
        assert_eq!(
            ConfigurationValue::from_json(&json!(7.5)).ok(),
            Some(ConfigurationValue::Float(7.5))
        );
        assert_eq!(
            ConfigurationValue::from_json(&json!("true")).ok(),
            Some(ConfigurationValue::Text("true".to_string()))
        );
    }

    #[test]
    fn test_null_is_unsupported() {
        let result = ConfigurationValue::from_json(&json!({"a": [1, null]}));
        match result {
            Err(CodecError::UnsupportedValue { path, shape }) => {
                assert_eq!(path, "$.a[1]");
                assert_eq!(shape, "null");
            }
            other => panic!("expected UnsupportedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_u64_overflow_is_unsupported() {
        let result = ConfigurationValue::from_json(&json!(u64::MAX));
        assert!(matches!(result, Err(CodecError::UnsupportedValue { .. })));
    }

    #[test]
    fn test_non_finite_float_fails_encode() {
        let value = ConfigurationValue::Sequence(vec![ConfigurationValue::Float(f64::NAN)]);
        assert!(matches!(
            value.to_json(),
            Err(CodecError::UnsupportedValue { ref path, .. }) if path == "$[0]"
        ));
        assert!(serde_json::to_string(&value).is_err());
    }

    #[test]
    fn test_serde_interop() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Limits {
            retries: i64,
            ratio: f64,
            hosts: Vec<String>,
        }

        let limits = Limits {
            retries: 3,
            ratio: 0.5,
            hosts: vec!["a".to_string()],
        };
        let value = to_value(&limits);
        assert!(value.is_ok());
        let value = value.unwrap_or(ConfigurationValue::Boolean(false));
        assert_eq!(value.get("retries"), Some(&ConfigurationValue::Integer(3)));
        assert_eq!(from_value::<Limits>(&value).ok(), Some(limits));
    }
}
