//! Request and response types for the OWS2 HTTP API.
//!
//! Every endpoint is a `POST` with a JSON body. Request types serialize to
//! the camel-case keys the backend expects; response types are decoded
//! through [`codec::decode`], which folds PascalCase keys first.
//!
//! # Endpoints covered
//!
//! | Path | Request | Response |
//! |------|---------|----------|
//! | `api/Users/LoginAndCreateSession` | [`LoginRequest`] | [`LoginResponse`] |
//! | `api/Users/RegisterUser` | [`RegisterRequest`] | [`LoginResponse`] |
//! | `api/Users/GetAllCharacters` | [`SessionRequest`] | list of [`UserCharacter`] |
//! | `api/Users/CreateCharacter` | [`CreateCharacterRequest`] | [`CreateCharacterResponse`] |
//! | `api/Users/CreateCharacterUsingDefaultCharacterValues` | [`CreateDefaultCharacterRequest`] | [`CreateCharacterResponse`] |
//! | `api/Users/RemoveCharacter` | [`RemoveCharacterRequest`] | [`SuccessAndErrorMessage`] |
//! | `api/Users/SetSelectedCharacterAndGetUserSession` | [`SelectCharacterRequest`] | [`UserSession`] |
//! | `api/Users/GetServerToConnectTo` | [`ServerToConnectToRequest`] | [`ServerToConnectTo`] |
//! | `api/Users/GetPlayerGroupsCharacterIsIn` | [`PlayerGroupsRequest`] | [`PlayerGroupsResponse`] |
//! | `api/Characters/GetByName` | [`CharacterNameRequest`] | JSON object |
//! | `api/Characters/ByName` | [`CharacterNameRequest`] | JSON object |
//! | `api/Characters/UpdateCharacterStats` | JSON object | empty |
//! | `api/Characters/GetCustomData` | [`CharacterNameRequest`] | JSON object |
//! | `api/Characters/AddOrUpdateCustomData` | [`AddOrUpdateCustomDataRequest`] | empty |
//! | `api/Characters/PlayerLogout` | [`CharacterNameRequest`] | empty |
//! | `api/Abilities/AddAbilityToCharacter` | [`AbilityRequest`] | empty |
//! | `api/Abilities/GetCharacterAbilities` | [`CharacterNameRequest`] | list of [`Ability`] |
//! | `api/Abilities/GetAbilityBars` | [`CharacterNameRequest`] | list of [`AbilityBar`] |
//! | `api/Abilities/UpdateAbilityOnCharacter` | [`AbilityRequest`] | empty |
//! | `api/Abilities/RemoveAbilityFromCharacter` | [`RemoveAbilityRequest`] | empty |

pub mod ability;
pub mod character;
pub mod codec;
pub mod group;
pub mod user;

pub use ability::{Ability, AbilityBar, AbilityRequest, RemoveAbilityRequest};
pub use character::{
    AddOrUpdateCustomDataRequest, CharacterNameRequest, CreateCharacterRequest,
    CreateCharacterResponse, CreateDefaultCharacterRequest, CustomCharacterData,
    RemoveCharacterRequest, SuccessAndErrorMessage,
};
pub use group::{PlayerGroup, PlayerGroupsRequest, PlayerGroupsResponse, NO_GROUP};
pub use user::{
    LoginRequest, LoginResponse, RegisterRequest, SelectCharacterRequest, ServerToConnectTo,
    ServerToConnectToRequest, SessionRequest, UserCharacter, UserSession,
};
