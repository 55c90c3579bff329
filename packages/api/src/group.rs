//! Player group types (`api/Users/GetPlayerGroupsCharacterIsIn`).
//!
//! This endpoint predates the `ErrorMessage` convention: it reports success
//! with `"success": "true"` and failure text in `errmsg`.

use serde::{Deserialize, Serialize};

/// Group type that means "no group". Used when resolving a zone server.
pub const NO_GROUP: i32 = 0;

/// Request body for `api/Users/GetPlayerGroupsCharacterIsIn`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGroupsRequest {
    #[serde(rename = "userSessionGUID")]
    pub user_session_guid: String,
    pub character_name: String,
    #[serde(rename = "playerGroupTypeID")]
    pub player_group_type_id: i32,
}

/// Response body for `api/Users/GetPlayerGroupsCharacterIsIn`.
///
/// `rows` is absent (not empty) when the backend has nothing to report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerGroupsResponse {
    #[serde(default, deserialize_with = "crate::codec::flag")]
    pub success: bool,

    #[serde(default)]
    pub rows: Option<Vec<PlayerGroup>>,

    #[serde(default)]
    pub errmsg: String,
}

/// One group membership row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGroup {
    #[serde(rename = "playerGroupID", default)]
    pub player_group_id: i64,

    #[serde(default)]
    pub player_group_name: String,

    #[serde(rename = "playerGroupTypeID", default)]
    pub player_group_type_id: i32,

    #[serde(default)]
    pub ready_state: i32,

    #[serde(default)]
    pub team_number: i32,

    /// Kept as sent; the backend uses a local-time ISO 8601 form without
    /// an offset.
    #[serde(default)]
    pub date_added: String,
}
