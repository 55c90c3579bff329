//! Account, session and character-selection types (`api/Users/*`).

use ows_core::{Coordinates, ZoneServerLocation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `api/Users/LoginAndCreateSession`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `api/Users/RegisterUser`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Response body for `api/Users/LoginAndCreateSession` and
/// `api/Users/RegisterUser`.
///
/// ```json
/// {
///   "Authenticated":   true,
///   "UserSessionGUID": "7f1c2e4a-...",
///   "ErrorMessage":    ""
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "crate::codec::flag")]
    pub authenticated: bool,

    #[serde(rename = "userSessionGUID", default)]
    pub user_session_guid: String,

    #[serde(default)]
    pub error_message: String,
}

/// Request body for endpoints that only need the session:
/// `api/Users/GetAllCharacters`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRequest {
    #[serde(rename = "userSessionGUID")]
    pub user_session_guid: String,
}

/// One entry of the `api/Users/GetAllCharacters` response array.
///
/// Only the fields the session client relies on are typed; everything else
/// the backend sends is kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCharacter {
    #[serde(default)]
    pub character_name: String,

    #[serde(default)]
    pub class_name: String,

    #[serde(default)]
    pub level: i64,

    #[serde(default)]
    pub gender: i64,

    #[serde(default)]
    pub zone_name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for `api/Users/SetSelectedCharacterAndGetUserSession`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectCharacterRequest {
    #[serde(rename = "userSessionGUID")]
    pub user_session_guid: String,
    pub selected_character_name: String,
}

/// Response body for `api/Users/SetSelectedCharacterAndGetUserSession`:
/// the session plus the selected character's last known position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(rename = "userSessionGUID", default)]
    pub user_session_guid: String,

    #[serde(default)]
    pub selected_character_name: String,

    #[serde(default)]
    pub char_name: String,

    #[serde(default)]
    pub zone_name: String,

    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub rx: f32,
    #[serde(default)]
    pub ry: f32,
    #[serde(default)]
    pub rz: f32,

    #[serde(default)]
    pub error_message: String,
}

impl UserSession {
    /// The selected character: `CharName`, falling back to
    /// `SelectedCharacterName`.
    pub fn character_name(&self) -> &str {
        if self.char_name.is_empty() {
            &self.selected_character_name
        } else {
            &self.char_name
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.x, self.y, self.z, self.rx, self.ry, self.rz)
    }
}

/// Request body for `api/Users/GetServerToConnectTo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerToConnectToRequest {
    pub character_name: String,
    pub zone_name: String,
    pub player_group_type: i32,
}

/// Response body for `api/Users/GetServerToConnectTo`.
///
/// ```json
/// { "serverip": "10.0.0.5", "port": "7777" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerToConnectTo {
    #[serde(default)]
    pub serverip: String,

    #[serde(default, deserialize_with = "string_or_number")]
    pub port: String,
}

impl ServerToConnectTo {
    pub fn location(&self) -> ZoneServerLocation {
        ZoneServerLocation::new(self.serverip.trim(), self.port.trim())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    #[test]
    fn login_request_body() {
        let body = encode(&LoginRequest {
            email: "a@b.c".into(),
            password: "pw".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"email":"a@b.c","password":"pw"}"#);
    }

    #[test]
    fn register_request_body() {
        let body = encode(&RegisterRequest {
            email: "a@b.c".into(),
            password: "pw".into(),
            first_name: "Ada".into(),
            last_name: "L".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            r#"{"email":"a@b.c","password":"pw","firstName":"Ada","lastName":"L"}"#
        );
    }

    #[test]
    fn login_response_pascal_case() {
        let r: LoginResponse = decode(
            r#"{"Authenticated":true,"UserSessionGUID":"sess-1","ErrorMessage":""}"#,
        )
        .unwrap();
        assert!(r.authenticated);
        assert_eq!(r.user_session_guid, "sess-1");
        assert!(r.error_message.is_empty());
    }

    #[test]
    fn login_response_camel_case_and_missing_fields() {
        let r: LoginResponse = decode(r#"{"userSessionGUID":"sess-1"}"#).unwrap();
        assert!(!r.authenticated);
        assert_eq!(r.user_session_guid, "sess-1");
    }

    #[test]
    fn select_request_body() {
        let body = encode(&SelectCharacterRequest {
            user_session_guid: "sess-1".into(),
            selected_character_name: "Hero".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            r#"{"userSessionGUID":"sess-1","selectedCharacterName":"Hero"}"#
        );
    }

    #[test]
    fn user_session_fields() {
        let s: UserSession = decode(
            r#"{"UserSessionGUID":"sess-1","CharName":"Hero","ZoneName":"Town",
                "X":10,"Y":20.5,"Z":30,"RX":0,"RY":90,"RZ":0}"#,
        )
        .unwrap();
        assert_eq!(s.character_name(), "Hero");
        assert_eq!(s.zone_name, "Town");
        assert_eq!(s.coordinates(), Coordinates::new(10.0, 20.5, 30.0, 0.0, 90.0, 0.0));
    }

    #[test]
    fn user_session_name_falls_back() {
        let s: UserSession = decode(r#"{"SelectedCharacterName":"Hero"}"#).unwrap();
        assert_eq!(s.character_name(), "Hero");
    }

    #[test]
    fn server_to_connect_to_numeric_port() {
        let s: ServerToConnectTo = decode(r#"{"serverip":"10.0.0.5","port":7777}"#).unwrap();
        assert_eq!(s.location(), ZoneServerLocation::new("10.0.0.5", "7777"));
    }

    #[test]
    fn user_character_keeps_extra_fields() {
        let list: Vec<UserCharacter> = decode(
            r#"[{"CharacterName":"Hero","ClassName":"MaleWarrior","Level":3,"Gold":12}]"#,
        )
        .unwrap();
        assert_eq!(list[0].character_name, "Hero");
        assert_eq!(list[0].level, 3);
        assert_eq!(list[0].extra.get("gold"), Some(&Value::from(12)));
    }
}
