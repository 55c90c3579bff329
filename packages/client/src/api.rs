//! Stateless request/response mapping for every OWS2 endpoint.
//!
//! [`OwsApi`] owns no session state. Each method builds the request body,
//! posts it, maps the response to a typed result and reports the outcome to
//! the configured [`EventSink`] exactly once. Handles are cheap to clone, so
//! independent calls (ability queries while a travel sequence is running) can
//! run on their own clone.
//!
//! # Response handling
//!
//! 1. Serialize the request. Failure: `Serialization`, nothing is sent.
//! 2. Post it. No response or a non-2xx status: `Transport`.
//! 3. Parse the body as JSON. Failure: `Deserialization`.
//! 4. A non-empty `ErrorMessage` in the body: `Application`, verbatim.
//! 5. Decode into the response type. Failure: `Deserialization`.
//! 6. Required fields missing or empty: `Validation`.

use std::sync::Arc;

use ows_api::codec::{self, server_error};
use ows_api::{
    Ability, AbilityBar, AbilityRequest, AddOrUpdateCustomDataRequest, CharacterNameRequest,
    CreateCharacterRequest, CreateCharacterResponse, CreateDefaultCharacterRequest,
    CustomCharacterData, LoginRequest, LoginResponse, PlayerGroup, PlayerGroupsRequest,
    PlayerGroupsResponse, RegisterRequest, RemoveAbilityRequest, RemoveCharacterRequest,
    SelectCharacterRequest, ServerToConnectTo, ServerToConnectToRequest, SessionRequest,
    SuccessAndErrorMessage, UserCharacter, UserSession,
};
use ows_core::{Endpoint, ZoneServerLocation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, Credentials};
use crate::error::{ApiError, ErrorKind};
use crate::events::{ClientEvent, EventSink, TracingSink};
use crate::transport::{HttpTransport, PostRequest, TransportError};

/// Typed access to the OWS2 backend.
#[derive(Clone)]
pub struct OwsApi {
    transport: Arc<dyn HttpTransport>,
    config: Arc<ClientConfig>,
    sink: Arc<dyn EventSink>,
}

impl OwsApi {
    /// Create a handle that reports to a [`TracingSink`].
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }

    /// Report `result` to the sink, then hand it back.
    pub(crate) fn report<T>(
        &self,
        result: Result<T, ApiError>,
        event: impl FnOnce(&T) -> ClientEvent,
    ) -> Result<T, ApiError> {
        match &result {
            Ok(value) => self.sink.on_success(&event(value)),
            Err(err) => self.sink.on_error(err),
        }
        result
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// `api/Users/LoginAndCreateSession`
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let endpoint = Endpoint::LoginAndCreateSession;
        let request = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let result = async {
            let response: LoginResponse = self.call(endpoint, &request).await?;
            if !response.authenticated || response.user_session_guid.is_empty() {
                return Err(ApiError::application(
                    endpoint,
                    "Unknown login error: not authenticated",
                ));
            }
            Ok(response)
        }
        .await;
        self.report(result, |r| ClientEvent::LoggedIn {
            session_id: r.user_session_guid.clone(),
        })
    }

    /// `api/Users/RegisterUser`
    pub async fn register(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = RegisterRequest {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
            first_name: credentials.first_name.clone(),
            last_name: credentials.last_name.clone(),
        };
        let result: Result<LoginResponse, _> = self.call(Endpoint::RegisterUser, &request).await;
        self.report(result, |_| ClientEvent::Registered {
            email: credentials.email.clone(),
        })
    }

    /// `api/Users/GetAllCharacters`. An empty list is a `Validation` error.
    pub async fn list_characters(&self, session_id: &str) -> Result<Vec<UserCharacter>, ApiError> {
        let endpoint = Endpoint::GetAllCharacters;
        let request = SessionRequest {
            user_session_guid: session_id.into(),
        };
        let result = async {
            let characters: Vec<UserCharacter> = self.call(endpoint, &request).await?;
            if characters.is_empty() {
                return Err(ApiError::validation(endpoint, "account has no characters"));
            }
            Ok(characters)
        }
        .await;
        self.report(result, |c| ClientEvent::CharactersListed {
            characters: c.clone(),
        })
    }

    /// `api/Users/CreateCharacter`
    pub async fn create_character(
        &self,
        session_id: &str,
        character_name: &str,
        class_name: &str,
    ) -> Result<CreateCharacterResponse, ApiError> {
        let request = CreateCharacterRequest {
            user_session_guid: session_id.into(),
            character_name: character_name.into(),
            class_name: class_name.into(),
        };
        let result: Result<CreateCharacterResponse, _> =
            self.call(Endpoint::CreateCharacter, &request).await;
        self.report(result, |c| ClientEvent::CharacterCreated {
            character: c.clone(),
        })
    }

    /// `api/Users/CreateCharacterUsingDefaultCharacterValues`
    pub async fn create_default_character(
        &self,
        session_id: &str,
        character_name: &str,
        default_set_name: &str,
    ) -> Result<CreateCharacterResponse, ApiError> {
        let request = CreateDefaultCharacterRequest {
            user_session_guid: session_id.into(),
            character_name: character_name.into(),
            default_set_name: default_set_name.into(),
        };
        let result: Result<CreateCharacterResponse, _> = self
            .call(Endpoint::CreateCharacterUsingDefaultCharacterValues, &request)
            .await;
        self.report(result, |c| ClientEvent::CharacterCreated {
            character: c.clone(),
        })
    }

    /// `api/Users/RemoveCharacter`
    pub async fn remove_character(
        &self,
        session_id: &str,
        character_name: &str,
    ) -> Result<(), ApiError> {
        let request = RemoveCharacterRequest {
            user_session_guid: session_id.into(),
            character_name: character_name.into(),
        };
        let result = self
            .call::<_, SuccessAndErrorMessage>(Endpoint::RemoveCharacter, &request)
            .await
            .map(|_| ());
        self.report(result, |_| ClientEvent::CharacterRemoved {
            character_name: character_name.into(),
        })
    }

    /// `api/Users/SetSelectedCharacterAndGetUserSession`
    ///
    /// The name is trimmed before sending. A response without a character
    /// name is a `Validation` error.
    pub async fn select_character(
        &self,
        session_id: &str,
        character_name: &str,
    ) -> Result<UserSession, ApiError> {
        let endpoint = Endpoint::SetSelectedCharacterAndGetUserSession;
        let character_name = character_name.trim();
        let result = async {
            if character_name.is_empty() {
                return Err(ApiError::validation(endpoint, "character name must not be empty"));
            }
            let request = SelectCharacterRequest {
                user_session_guid: session_id.into(),
                selected_character_name: character_name.into(),
            };
            let session: UserSession = self.call(endpoint, &request).await?;
            if session.character_name().is_empty() {
                return Err(ApiError::validation(endpoint, "server returned no character"));
            }
            debug!(
                "api: {} location is {}, {}, {}",
                session.character_name(),
                session.x,
                session.y,
                session.z
            );
            Ok(session)
        }
        .await;
        self.report(result, |s| ClientEvent::CharacterSelected { session: s.clone() })
    }

    /// `api/Users/GetServerToConnectTo`
    ///
    /// Pass [`ows_core::LAST_ZONE`] as `zone_name` for the character's last
    /// zone. An empty host or port is a `Validation` error.
    pub async fn resolve_zone_server(
        &self,
        character_name: &str,
        zone_name: &str,
        player_group_type: i32,
    ) -> Result<ZoneServerLocation, ApiError> {
        let endpoint = Endpoint::GetServerToConnectTo;
        let request = ServerToConnectToRequest {
            character_name: character_name.into(),
            zone_name: zone_name.into(),
            player_group_type,
        };
        let result = async {
            let server: ServerToConnectTo = self.call(endpoint, &request).await?;
            let location = server.location();
            if !location.is_complete() {
                return Err(ApiError::validation(endpoint, "cannot get server ip and port"));
            }
            Ok(location)
        }
        .await;
        self.report(result, |l| ClientEvent::ZoneServerResolved {
            location: l.clone(),
        })
    }

    /// `api/Users/GetPlayerGroupsCharacterIsIn`
    ///
    /// A `success` other than `"true"` is an `Application` error carrying
    /// `errmsg`; a successful response without `rows` is a `Validation` error.
    pub async fn player_groups(
        &self,
        session_id: &str,
        character_name: &str,
        player_group_type_id: i32,
    ) -> Result<Vec<PlayerGroup>, ApiError> {
        let endpoint = Endpoint::GetPlayerGroupsCharacterIsIn;
        let request = PlayerGroupsRequest {
            user_session_guid: session_id.into(),
            character_name: character_name.into(),
            player_group_type_id,
        };
        let result = async {
            let response: PlayerGroupsResponse = self.call(endpoint, &request).await?;
            if !response.success {
                let message = if response.errmsg.is_empty() {
                    "request failed".to_string()
                } else {
                    response.errmsg
                };
                return Err(ApiError::application(endpoint, message));
            }
            response
                .rows
                .ok_or_else(|| ApiError::validation(endpoint, "no rows in response"))
        }
        .await;
        self.report(result, |g| ClientEvent::PlayerGroupsListed { groups: g.clone() })
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// `api/Characters/GetByName`: the character's stats as sent.
    pub async fn character_stats(&self, character_name: &str) -> Result<Value, ApiError> {
        let request = CharacterNameRequest::new(character_name);
        let result = self.call_raw(Endpoint::GetCharacterByName, &request).await;
        self.report(result, |d| ClientEvent::CharacterStats { data: d.clone() })
    }

    /// `api/Characters/ByName`: character data and custom data as sent.
    pub async fn character_data(&self, character_name: &str) -> Result<Value, ApiError> {
        let request = CharacterNameRequest::new(character_name);
        let result = self.call_raw(Endpoint::GetCharacterDataByName, &request).await;
        self.report(result, |d| ClientEvent::CharacterData { data: d.clone() })
    }

    /// `api/Characters/UpdateCharacterStats`. `stats` is sent as is.
    pub async fn update_character_stats(&self, stats: &Value) -> Result<(), ApiError> {
        let result = self.call_unit(Endpoint::UpdateCharacterStats, stats).await;
        self.report(result, |_| ClientEvent::StatsUpdated)
    }

    /// `api/Characters/GetCustomData`
    pub async fn custom_data(&self, character_name: &str) -> Result<Value, ApiError> {
        let request = CharacterNameRequest::new(character_name);
        let result = self.call_raw(Endpoint::GetCustomData, &request).await;
        self.report(result, |d| ClientEvent::CustomDataLoaded { data: d.clone() })
    }

    /// `api/Characters/AddOrUpdateCustomData`
    pub async fn add_or_update_custom_data(
        &self,
        character_name: &str,
        field_name: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        let request = AddOrUpdateCustomDataRequest {
            add_or_update_custom_character_data: CustomCharacterData {
                character_name: character_name.into(),
                custom_field_name: field_name.into(),
                field_value: value.into(),
            },
        };
        self.acknowledge(Endpoint::AddOrUpdateCustomData, &request)
            .await
    }

    /// `api/Characters/PlayerLogout`. The character name must not be empty.
    pub async fn player_logout(&self, character_name: &str) -> Result<(), ApiError> {
        let endpoint = Endpoint::PlayerLogout;
        let result = async {
            if character_name.is_empty() {
                return Err(ApiError::validation(endpoint, "character name must not be empty"));
            }
            let request = CharacterNameRequest::new(character_name);
            self.call_unit(endpoint, &request).await
        }
        .await;
        self.report(result, |_| ClientEvent::LoggedOut {
            character_name: character_name.into(),
        })
    }

    // -----------------------------------------------------------------------
    // Abilities
    // -----------------------------------------------------------------------

    /// `api/Abilities/AddAbilityToCharacter`
    pub async fn add_ability(
        &self,
        character_name: &str,
        ability_name: &str,
        ability_level: i32,
        custom_json: &str,
    ) -> Result<(), ApiError> {
        let request = ability_request(character_name, ability_name, ability_level, custom_json);
        self.acknowledge(Endpoint::AddAbilityToCharacter, &request)
            .await
    }

    /// `api/Abilities/UpdateAbilityOnCharacter`
    pub async fn update_ability(
        &self,
        character_name: &str,
        ability_name: &str,
        ability_level: i32,
        custom_json: &str,
    ) -> Result<(), ApiError> {
        let request = ability_request(character_name, ability_name, ability_level, custom_json);
        self.acknowledge(Endpoint::UpdateAbilityOnCharacter, &request)
            .await
    }

    /// `api/Abilities/RemoveAbilityFromCharacter`
    pub async fn remove_ability(
        &self,
        character_name: &str,
        ability_name: &str,
    ) -> Result<(), ApiError> {
        let request = RemoveAbilityRequest {
            character_name: character_name.into(),
            ability_name: ability_name.into(),
        };
        self.acknowledge(Endpoint::RemoveAbilityFromCharacter, &request)
            .await
    }

    /// `api/Abilities/GetCharacterAbilities`
    pub async fn abilities(&self, character_name: &str) -> Result<Vec<Ability>, ApiError> {
        let request = CharacterNameRequest::new(character_name);
        let result: Result<Vec<Ability>, _> =
            self.call(Endpoint::GetCharacterAbilities, &request).await;
        self.report(result, |a| ClientEvent::AbilitiesListed {
            abilities: a.clone(),
        })
    }

    /// `api/Abilities/GetAbilityBars`
    pub async fn ability_bars(&self, character_name: &str) -> Result<Vec<AbilityBar>, ApiError> {
        let request = CharacterNameRequest::new(character_name);
        let result: Result<Vec<AbilityBar>, _> = self.call(Endpoint::GetAbilityBars, &request).await;
        self.report(result, |b| ClientEvent::AbilityBarsListed { bars: b.clone() })
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Post a request and decode the response into `T`.
    async fn call<Req, T>(&self, endpoint: Endpoint, request: &Req) -> Result<T, ApiError>
    where
        Req: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.call_raw(endpoint, request).await?;
        codec::decode_value(value).map_err(|e| ApiError::deserialization(endpoint, e))
    }

    /// Post a request and return the response body as JSON, keys untouched.
    async fn call_raw<Req>(&self, endpoint: Endpoint, request: &Req) -> Result<Value, ApiError>
    where
        Req: Serialize + ?Sized,
    {
        let body = self.send(endpoint, request).await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| ApiError::deserialization(endpoint, e))?;
        if let Some(message) = server_error(&value) {
            return Err(ApiError::application(endpoint, message));
        }
        Ok(value)
    }

    /// Post a request whose response may be empty. A non-empty body must
    /// still be JSON and is checked for an error message.
    async fn call_unit<Req>(&self, endpoint: Endpoint, request: &Req) -> Result<(), ApiError>
    where
        Req: Serialize + ?Sized,
    {
        let body = self.send(endpoint, request).await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        let value: Value =
            serde_json::from_str(&body).map_err(|e| ApiError::deserialization(endpoint, e))?;
        match server_error(&value) {
            Some(message) => Err(ApiError::application(endpoint, message)),
            None => Ok(()),
        }
    }

    /// [`Self::call_unit`], reported as [`ClientEvent::Completed`].
    async fn acknowledge<Req>(&self, endpoint: Endpoint, request: &Req) -> Result<(), ApiError>
    where
        Req: Serialize + ?Sized,
    {
        let result = self.call_unit(endpoint, request).await;
        self.report(result, |_| ClientEvent::Completed {
            operation: endpoint.name().to_string(),
        })
    }

    async fn send<Req>(&self, endpoint: Endpoint, request: &Req) -> Result<String, ApiError>
    where
        Req: Serialize + ?Sized,
    {
        let body = codec::encode(request).map_err(|e| ApiError::serialization(endpoint, e))?;
        let request = PostRequest {
            url: self.config.api_paths.url(endpoint),
            customer_key: self.config.customer_key.clone(),
            user_agent: self.config.user_agent.clone(),
            body,
        };
        debug!("api: POST {}", request.url);

        let response = self
            .transport
            .post(request)
            .await
            .map_err(|e| ApiError::new(endpoint, ErrorKind::Transport(e)))?;
        if !response.is_success() {
            return Err(ApiError::new(
                endpoint,
                TransportError::BadStatus(response.status).into(),
            ));
        }
        debug!("api: {endpoint} response: {}", response.body);
        Ok(response.body)
    }
}

fn ability_request(
    character_name: &str,
    ability_name: &str,
    ability_level: i32,
    custom_json: &str,
) -> AbilityRequest {
    AbilityRequest {
        character_name: character_name.into(),
        ability_name: ability_name.into(),
        ability_level,
        custom_json: custom_json.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelSink, Notification};
    use crate::transport::scripted::ScriptedTransport;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn setup() -> (OwsApi, Arc<ScriptedTransport>, UnboundedReceiver<Notification>) {
        let transport = Arc::new(ScriptedTransport::new());
        let (sink, rx) = ChannelSink::new();
        let mut config = ClientConfig::new("http://ows.test/", "cust-key", "mykey");
        config.api_paths.character_persistence = "http://persist.test".into();
        let api = OwsApi::new(config, transport.clone()).with_sink(Arc::new(sink));
        (api, transport, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    #[tokio::test]
    async fn login_success_reports_once() {
        let (api, transport, mut rx) = setup();
        transport.reply_json(json!({
            "Authenticated": true, "UserSessionGUID": "sess-1", "ErrorMessage": ""
        }));

        let response = api.login("a@b.c", "pw").await.unwrap();
        assert_eq!(response.user_session_guid, "sess-1");
        assert_eq!(
            drain(&mut rx),
            vec![Notification::Success(ClientEvent::LoggedIn {
                session_id: "sess-1".into()
            })]
        );

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://ows.test/api/Users/LoginAndCreateSession");
        assert_eq!(request.customer_key, "cust-key");
        assert_eq!(request.user_agent, "X-UnrealEngine-Agent");
        assert_eq!(request.body, r#"{"email":"a@b.c","password":"pw"}"#);
    }

    #[tokio::test]
    async fn login_without_authenticated_is_application_error() {
        let (api, transport, mut rx) = setup();
        transport.reply_json(json!({"UserSessionGUID": "sess-1", "ErrorMessage": ""}));

        let err = api.login("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Application(_)));
        let notes = drain(&mut rx);
        assert_eq!(notes.len(), 1);
        assert!(matches!(notes[0], Notification::Error(_)));
    }

    #[tokio::test]
    async fn login_with_empty_session_is_application_error() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"Authenticated": true, "UserSessionGUID": ""}));
        let err = api.login("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Application(_)));
    }

    #[tokio::test]
    async fn server_error_message_is_verbatim() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"Authenticated": false, "ErrorMessage": "Invalid password"}));
        let err = api.login("a@b.c", "bad").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Application("Invalid password".into()));
        assert_eq!(err.to_string(), "LoginAndCreateSession - Invalid password");
    }

    #[tokio::test]
    async fn malformed_json_names_operation() {
        let (api, transport, mut rx) = setup();
        transport.reply(200, "<html>oops</html>");
        let err = api.list_characters("sess-1").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Deserialization(_)));
        assert!(err.to_string().starts_with("GetAllCharacters - "));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn wrong_shape_is_deserialization_error() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"not": "a list"}));
        let err = api.list_characters("sess-1").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Deserialization(_)));
    }

    #[tokio::test]
    async fn empty_character_list_is_validation_error() {
        let (api, transport, mut rx) = setup();
        transport.reply_json(json!([]));
        let err = api.list_characters("sess-1").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Validation(_)));
        assert!(matches!(drain(&mut rx).as_slice(), [Notification::Error(_)]));
    }

    #[tokio::test]
    async fn bad_status_is_transport_error() {
        let (api, transport, _rx) = setup();
        transport.reply(500, "");
        let err = api.list_characters("sess-1").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport(TransportError::BadStatus(500)));
    }

    #[tokio::test]
    async fn timeout_is_transport_error() {
        let (api, transport, _rx) = setup();
        transport.fail(TransportError::Timeout);
        let err = api.character_stats("Hero").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport(TransportError::Timeout));
    }

    #[tokio::test]
    async fn select_trims_name_and_reads_position() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({
            "UserSessionGUID": "sess-1", "CharName": "Hero", "ZoneName": "Town",
            "X": 1.5, "Y": 2, "Z": 3, "RX": 0, "RY": 0, "RZ": 90
        }));
        let session = api.select_character("sess-1", "  Hero ").await.unwrap();
        assert_eq!(session.character_name(), "Hero");
        assert_eq!(session.rz, 90.0);
        assert_eq!(
            transport.requests()[0].body,
            r#"{"userSessionGUID":"sess-1","selectedCharacterName":"Hero"}"#
        );
    }

    #[tokio::test]
    async fn select_without_character_is_validation_error() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"UserSessionGUID": "sess-1", "CharName": ""}));
        let err = api.select_character("sess-1", "Hero").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Validation(_)));
    }

    #[tokio::test]
    async fn resolve_requires_host_and_port() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"serverip": "10.0.0.5", "port": ""}));
        let err = api
            .resolve_zone_server("Hero", ows_core::LAST_ZONE, ows_api::NO_GROUP)
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Validation(_)));
        assert_eq!(
            transport.requests()[0].body,
            r#"{"characterName":"Hero","zoneName":"GETLASTZONENAME","playerGroupType":0}"#
        );
    }

    #[tokio::test]
    async fn resolve_keeps_full_port() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"serverip": "10.0.0.5", "port": "17777"}));
        let location = api.resolve_zone_server("Hero", "Town", 0).await.unwrap();
        assert_eq!(location.address(), "10.0.0.5:17777");
    }

    #[tokio::test]
    async fn player_groups_outcomes() {
        let (api, transport, _rx) = setup();
        transport
            .reply_json(json!({"success": "false", "errmsg": "No such character"}))
            .reply_json(json!({"success": "true"}))
            .reply_json(json!({"success": "true", "rows": [
                {"PlayerGroupID": 4, "PlayerGroupName": "Raid", "PlayerGroupTypeID": 2,
                 "ReadyState": 0, "TeamNumber": 1, "DateAdded": "2024-05-01T12:00:00"}
            ]}));

        let err = api.player_groups("sess-1", "Hero", 2).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Application("No such character".into()));

        let err = api.player_groups("sess-1", "Hero", 2).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Validation(_)));

        let groups = api.player_groups("sess-1", "Hero", 2).await.unwrap();
        assert_eq!(groups[0].player_group_name, "Raid");
    }

    #[tokio::test]
    async fn character_persistence_calls_use_module_base() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"CharacterName": "Hero", "Gold": 5}));
        let data = api.character_stats("Hero").await.unwrap();
        assert_eq!(data["Gold"], 5);
        assert_eq!(
            transport.requests()[0].url,
            "http://persist.test/api/Characters/GetByName"
        );
    }

    #[tokio::test]
    async fn unit_calls_accept_empty_body() {
        let (api, transport, mut rx) = setup();
        transport.reply(200, "").reply(200, "not json");

        api.add_ability("Hero", "Fireball", 1, "").await.unwrap();
        let err = api.remove_ability("Hero", "Fireball").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Deserialization(_)));

        let notes = drain(&mut rx);
        assert_eq!(
            notes[0],
            Notification::Success(ClientEvent::Completed {
                operation: "AddAbilityToCharacter".into()
            })
        );
        assert!(matches!(notes[1], Notification::Error(_)));
        assert_eq!(notes.len(), 2);
    }

    #[tokio::test]
    async fn character_data_uses_public_base() {
        let (api, transport, mut rx) = setup();
        transport.reply_json(json!({"CharacterName": "Hero", "CustomCharacterDataRows": []}));

        let data = api.character_data("Hero").await.unwrap();
        assert_eq!(data["CharacterName"], "Hero");

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://ows.test/api/Characters/ByName");
        assert_eq!(request.body, r#"{"characterName":"Hero"}"#);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [Notification::Success(ClientEvent::CharacterData { .. })]
        ));
    }

    #[tokio::test]
    async fn custom_data_reads_and_writes() {
        let (api, transport, mut rx) = setup();
        transport
            .reply_json(json!({"Rows": [{"CustomFieldName": "Faction", "FieldValue": "North"}]}))
            .reply(200, "")
            .reply_json(json!({"ErrorMessage": "Unknown character"}));

        let data = api.custom_data("Hero").await.unwrap();
        assert_eq!(data["Rows"][0]["FieldValue"], "North");

        api.add_or_update_custom_data("Hero", "Faction", "South")
            .await
            .unwrap();
        let err = api
            .add_or_update_custom_data("Nobody", "Faction", "South")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Application("Unknown character".into()));
        assert_eq!(err.to_string(), "AddOrUpdateCustomData - Unknown character");

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "http://persist.test/api/Characters/GetCustomData"
        );
        assert_eq!(
            requests[1].url,
            "http://persist.test/api/Characters/AddOrUpdateCustomData"
        );
        assert_eq!(
            requests[1].body,
            r#"{"addOrUpdateCustomCharacterData":{"characterName":"Hero","customFieldName":"Faction","fieldValue":"South"}}"#
        );

        let notes = drain(&mut rx);
        assert_eq!(notes.len(), 3);
        assert!(matches!(
            notes[0],
            Notification::Success(ClientEvent::CustomDataLoaded { .. })
        ));
        assert_eq!(
            notes[1],
            Notification::Success(ClientEvent::Completed {
                operation: "AddOrUpdateCustomData".into()
            })
        );
        assert!(matches!(notes[2], Notification::Error(_)));
    }

    #[tokio::test]
    async fn update_ability_posts_to_persistence() {
        let (api, transport, mut rx) = setup();
        transport
            .reply_json(json!({}))
            .reply_json(json!({"ErrorMessage": "No such ability"}));

        api.update_ability("Hero", "Fireball", 2, r#"{"cd":3}"#)
            .await
            .unwrap();
        let err = api
            .update_ability("Hero", "Icebolt", 1, "")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Application("No such ability".into()));

        let request = &transport.requests()[0];
        assert_eq!(
            request.url,
            "http://persist.test/api/Abilities/UpdateAbilityOnCharacter"
        );
        let body: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(
            body,
            json!({
                "characterName": "Hero",
                "abilityName": "Fireball",
                "abilityLevel": 2,
                "charHasAbilitiesCustomJSON": "{\"cd\":3}"
            })
        );

        let notes = drain(&mut rx);
        assert_eq!(notes.len(), 2);
        assert_eq!(
            notes[0],
            Notification::Success(ClientEvent::Completed {
                operation: "UpdateAbilityOnCharacter".into()
            })
        );
        assert!(matches!(notes[1], Notification::Error(_)));
    }

    #[tokio::test]
    async fn logout_requires_character_name() {
        let (api, transport, mut rx) = setup();
        let err = api.player_logout("").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Validation(_)));
        assert!(transport.requests().is_empty());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn logout_accepts_empty_body() {
        let (api, transport, mut rx) = setup();
        transport.reply(200, "");
        api.player_logout("Hero").await.unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![Notification::Success(ClientEvent::LoggedOut {
                character_name: "Hero".into()
            })]
        );
    }

    #[tokio::test]
    async fn update_stats_sends_object_as_is() {
        let (api, transport, _rx) = setup();
        transport.reply_json(json!({"Success": true, "ErrorMessage": ""}));
        let stats = json!({"characterName": "Hero", "level": 4});
        api.update_character_stats(&stats).await.unwrap();
        assert_eq!(transport.requests()[0].body, stats.to_string());
    }

    #[tokio::test]
    async fn abilities_and_bars_decode() {
        let (api, transport, _rx) = setup();
        transport
            .reply_json(json!([{"AbilityName": "Fireball", "AbilityLevel": 3}]))
            .reply_json(json!([{"AbilityBarName": "Main", "NumberOfSlots": 8}]));
        assert_eq!(api.abilities("Hero").await.unwrap()[0].ability_level, 3);
        assert_eq!(api.ability_bars("Hero").await.unwrap()[0].number_of_slots, 8);
    }
}
