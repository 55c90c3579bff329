//! JSON body encoding and response key folding.
//!
//! The backend is not consistent about key case: the same response may come
//! back as `{"UserSessionGUID": ...}` from one deployment and
//! `{"userSessionGUID": ...}` from another. Responses are therefore folded to
//! camel case with [`fold_keys`] before typed decoding, and every response type
//! in this crate is declared against the folded names.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lower the leading uppercase run of `key`, keeping the last capital of the
/// run when it starts the next word.
///
/// | Input | Output |
/// |-------|--------|
/// | `UserSessionGUID` | `userSessionGUID` |
/// | `RX` | `rx` |
/// | `GUIDValue` | `guidValue` |
/// | `serverip` | `serverip` |
pub fn camel_case_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.first() {
        Some(c) if c.is_uppercase() => {}
        _ => return key.to_string(),
    }

    let mut out = chars.clone();
    for i in 0..chars.len() {
        if i == 1 && !chars[i].is_uppercase() {
            break;
        }
        let next_is_lower = chars.get(i + 1).is_some_and(|c| !c.is_uppercase());
        if i > 0 && next_is_lower {
            break;
        }
        out[i] = chars[i].to_lowercase().next().unwrap_or(chars[i]);
    }
    out.into_iter().collect()
}

/// Recursively fold every object key in `value` with [`camel_case_key`].
pub fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (camel_case_key(&k), fold_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

/// Parse a response body, fold its keys and decode it into `T`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    decode_value(value)
}

/// Fold the keys of an already parsed body and decode it into `T`.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(fold_keys(value))
}

/// Serialize a request body.
pub fn encode<T: Serialize + ?Sized>(request: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(request)
}

/// The server-reported error text carried by a response, if any.
///
/// Looks for a non-empty top-level `ErrorMessage` (any key case) on an
/// object body. Arrays and scalars never carry one.
pub fn server_error(value: &Value) -> Option<&str> {
    value
        .as_object()?
        .iter()
        .find(|(key, _)| camel_case_key(key) == "errorMessage")
        .and_then(|(_, msg)| msg.as_str())
        .filter(|msg| !msg.is_empty())
}

/// Deserialize a flag sent either as a JSON boolean or as the string
/// `"true"`/`"false"`. Missing or null means `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Text(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid flag {other:?}"))),
        },
    }
}
