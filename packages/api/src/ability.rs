//! Ability types (`api/Abilities/*`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `api/Abilities/AddAbilityToCharacter` and
/// `api/Abilities/UpdateAbilityOnCharacter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbilityRequest {
    pub character_name: String,
    pub ability_name: String,
    pub ability_level: i32,
    #[serde(rename = "charHasAbilitiesCustomJSON")]
    pub custom_json: String,
}

/// Request body for `api/Abilities/RemoveAbilityFromCharacter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAbilityRequest {
    pub character_name: String,
    pub ability_name: String,
}

/// One ability granted to a character.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    #[serde(default)]
    pub ability_name: String,

    #[serde(default)]
    pub ability_level: i32,

    #[serde(rename = "charHasAbilitiesCustomJSON", default)]
    pub custom_json: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An ability bar and its slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbilityBar {
    #[serde(default)]
    pub ability_bar_name: String,

    #[serde(default)]
    pub number_of_slots: i32,

    #[serde(default)]
    pub max_number_of_slots: i32,

    #[serde(rename = "abilityBarsCustomJSON", default)]
    pub custom_json: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    #[test]
    fn ability_request_body() {
        let body = encode(&AbilityRequest {
            character_name: "Hero".into(),
            ability_name: "Fireball".into(),
            ability_level: 2,
            custom_json: "{}".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            r#"{"characterName":"Hero","abilityName":"Fireball","abilityLevel":2,"charHasAbilitiesCustomJSON":"{}"}"#
        );
    }

    #[test]
    fn abilities_from_pascal_case() {
        let list: Vec<Ability> = decode(
            r#"[{"AbilityName":"Fireball","AbilityLevel":2,"CharHasAbilitiesCustomJSON":"","AbilityID":7}]"#,
        )
        .unwrap();
        assert_eq!(list[0].ability_name, "Fireball");
        assert_eq!(list[0].ability_level, 2);
        assert_eq!(list[0].extra.get("abilityID"), Some(&Value::from(7)));
    }

    #[test]
    fn ability_bars_from_pascal_case() {
        let list: Vec<AbilityBar> =
            decode(r#"[{"AbilityBarName":"Main","NumberOfSlots":8,"MaxNumberOfSlots":10}]"#)
                .unwrap();
        assert_eq!(list[0].ability_bar_name, "Main");
        assert_eq!(list[0].number_of_slots, 8);
    }
}
