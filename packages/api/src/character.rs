//! Character lifecycle and character data types.
//!
//! Covers `api/Users/CreateCharacter`, `api/Users/CreateCharacterUsingDefaultCharacterValues`,
//! `api/Users/RemoveCharacter` and the `api/Characters/*` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `api/Users/CreateCharacter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    #[serde(rename = "userSessionGUID")]
    pub user_session_guid: String,
    pub character_name: String,
    pub class_name: String,
}

/// Request body for `api/Users/CreateCharacterUsingDefaultCharacterValues`.
///
/// `default_set_name` names a server-side template of starting values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDefaultCharacterRequest {
    #[serde(rename = "userSessionGUID")]
    pub user_session_guid: String,
    pub character_name: String,
    pub default_set_name: String,
}

/// Response body for both character creation endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterResponse {
    #[serde(default)]
    pub character_name: String,

    #[serde(default)]
    pub class_name: String,

    #[serde(default)]
    pub error_message: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for `api/Users/RemoveCharacter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCharacterRequest {
    #[serde(rename = "userSessionGUID")]
    pub user_session_guid: String,
    pub character_name: String,
}

/// Request body for endpoints keyed only by character:
/// `GetByName`, `ByName`, `GetCustomData`, `PlayerLogout`,
/// `GetCharacterAbilities` and `GetAbilityBars`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterNameRequest {
    pub character_name: String,
}

impl CharacterNameRequest {
    pub fn new(character_name: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
        }
    }
}

/// Generic acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuccessAndErrorMessage {
    #[serde(default, deserialize_with = "crate::codec::flag")]
    pub success: bool,

    #[serde(default)]
    pub error_message: String,
}

// ---------------------------------------------------------------------------
// Custom character data
// ---------------------------------------------------------------------------

/// One custom field stored against a character.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomCharacterData {
    pub character_name: String,
    pub custom_field_name: String,
    pub field_value: String,
}

/// Request body for `api/Characters/AddOrUpdateCustomData`.
///
/// ```json
/// {
///   "addOrUpdateCustomCharacterData": {
///     "characterName":   "Hero",
///     "customFieldName": "Faction",
///     "fieldValue":      "North"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddOrUpdateCustomDataRequest {
    pub add_or_update_custom_character_data: CustomCharacterData,
}
