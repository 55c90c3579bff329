//! Endpoint catalogue for the OWS2 HTTP API.
//!
//! Every call is a `POST` with a JSON body. Endpoints are grouped into three
//! API modules that may be hosted behind different base paths:
//!
//! | Module | Endpoints |
//! |--------|-----------|
//! | Public | `api/Users/*`, `api/Characters/ByName` |
//! | Character persistence | `api/Characters/*` (except `ByName`), `api/Abilities/*` |
//! | Instance management | none called by the session client |
//!
//! [`ApiPaths::url`] joins a module base path and an endpoint path.

use std::fmt;

/// The backend service that hosts an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiModule {
    Public,
    InstanceManagement,
    CharacterPersistence,
}

impl ApiModule {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiModule::Public => "public",
            ApiModule::InstanceManagement => "instance-management",
            ApiModule::CharacterPersistence => "character-persistence",
        }
    }
}

impl fmt::Display for ApiModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OWS2 endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    LoginAndCreateSession,
    RegisterUser,
    GetAllCharacters,
    CreateCharacter,
    CreateCharacterUsingDefaultCharacterValues,
    RemoveCharacter,
    SetSelectedCharacterAndGetUserSession,
    GetServerToConnectTo,
    GetPlayerGroupsCharacterIsIn,
    GetCharacterByName,
    GetCharacterDataByName,
    UpdateCharacterStats,
    GetCustomData,
    AddOrUpdateCustomData,
    PlayerLogout,
    AddAbilityToCharacter,
    GetCharacterAbilities,
    GetAbilityBars,
    UpdateAbilityOnCharacter,
    RemoveAbilityFromCharacter,
}

impl Endpoint {
    /// All endpoints, in catalogue order.
    pub const ALL: [Endpoint; 20] = [
        Endpoint::LoginAndCreateSession,
        Endpoint::RegisterUser,
        Endpoint::GetAllCharacters,
        Endpoint::CreateCharacter,
        Endpoint::CreateCharacterUsingDefaultCharacterValues,
        Endpoint::RemoveCharacter,
        Endpoint::SetSelectedCharacterAndGetUserSession,
        Endpoint::GetServerToConnectTo,
        Endpoint::GetPlayerGroupsCharacterIsIn,
        Endpoint::GetCharacterByName,
        Endpoint::GetCharacterDataByName,
        Endpoint::UpdateCharacterStats,
        Endpoint::GetCustomData,
        Endpoint::AddOrUpdateCustomData,
        Endpoint::PlayerLogout,
        Endpoint::AddAbilityToCharacter,
        Endpoint::GetCharacterAbilities,
        Endpoint::GetAbilityBars,
        Endpoint::UpdateAbilityOnCharacter,
        Endpoint::RemoveAbilityFromCharacter,
    ];

    /// Path relative to the module base, e.g. `api/Users/RegisterUser`.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::LoginAndCreateSession => "api/Users/LoginAndCreateSession",
            Endpoint::RegisterUser => "api/Users/RegisterUser",
            Endpoint::GetAllCharacters => "api/Users/GetAllCharacters",
            Endpoint::CreateCharacter => "api/Users/CreateCharacter",
            Endpoint::CreateCharacterUsingDefaultCharacterValues => {
                "api/Users/CreateCharacterUsingDefaultCharacterValues"
            }
            Endpoint::RemoveCharacter => "api/Users/RemoveCharacter",
            Endpoint::SetSelectedCharacterAndGetUserSession => {
                "api/Users/SetSelectedCharacterAndGetUserSession"
            }
            Endpoint::GetServerToConnectTo => "api/Users/GetServerToConnectTo",
            Endpoint::GetPlayerGroupsCharacterIsIn => "api/Users/GetPlayerGroupsCharacterIsIn",
            Endpoint::GetCharacterByName => "api/Characters/GetByName",
            Endpoint::GetCharacterDataByName => "api/Characters/ByName",
            Endpoint::UpdateCharacterStats => "api/Characters/UpdateCharacterStats",
            Endpoint::GetCustomData => "api/Characters/GetCustomData",
            Endpoint::AddOrUpdateCustomData => "api/Characters/AddOrUpdateCustomData",
            Endpoint::PlayerLogout => "api/Characters/PlayerLogout",
            Endpoint::AddAbilityToCharacter => "api/Abilities/AddAbilityToCharacter",
            Endpoint::GetCharacterAbilities => "api/Abilities/GetCharacterAbilities",
            Endpoint::GetAbilityBars => "api/Abilities/GetAbilityBars",
            Endpoint::UpdateAbilityOnCharacter => "api/Abilities/UpdateAbilityOnCharacter",
            Endpoint::RemoveAbilityFromCharacter => "api/Abilities/RemoveAbilityFromCharacter",
        }
    }

    pub fn module(self) -> ApiModule {
        match self {
            Endpoint::LoginAndCreateSession
            | Endpoint::RegisterUser
            | Endpoint::GetAllCharacters
            | Endpoint::CreateCharacter
            | Endpoint::CreateCharacterUsingDefaultCharacterValues
            | Endpoint::RemoveCharacter
            | Endpoint::SetSelectedCharacterAndGetUserSession
            | Endpoint::GetServerToConnectTo
            | Endpoint::GetPlayerGroupsCharacterIsIn
            | Endpoint::GetCharacterDataByName => ApiModule::Public,
            _ => ApiModule::CharacterPersistence,
        }
    }

    /// The operation name used in log lines and error messages: the last
    /// path segment (`GetAllCharacters`, `ByName`, ...).
    pub fn name(self) -> &'static str {
        let path = self.path();
        path.rsplit('/').next().unwrap_or(path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// ApiPaths
// ---------------------------------------------------------------------------

/// Base paths for the three API modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    pub public: String,
    pub instance_management: String,
    pub character_persistence: String,
}

impl ApiPaths {
    /// Serve every module from the same base path.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            public: base.clone(),
            instance_management: base.clone(),
            character_persistence: base,
        }
    }

    pub fn base_for(&self, module: ApiModule) -> &str {
        match module {
            ApiModule::Public => &self.public,
            ApiModule::InstanceManagement => &self.instance_management,
            ApiModule::CharacterPersistence => &self.character_persistence,
        }
    }

    /// Absolute URL for `endpoint`. Exactly one `/` separates base and path.
    pub fn url(&self, endpoint: Endpoint) -> String {
        let base = self.base_for(endpoint.module()).trim_end_matches('/');
        format!("{base}/{}", endpoint.path())
    }
}
