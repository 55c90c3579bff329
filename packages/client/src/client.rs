//! Protocol sequencing on top of [`OwsApi`].
//!
//! [`SessionClient`] owns the session and drives the chain
//!
//! ```text
//! register ─▶ login ─▶ list characters ─▶ select ─▶ resolve zone ─▶ travel URL
//!                  └──▶ create default character ─┘
//! ```
//!
//! Each step starts only after the previous one has completed, and every
//! mutating method takes `&mut self`, so two chains on one client cannot
//! interleave. Calls that need no session mutation can go through a cloned
//! [`OwsApi`] handle from [`SessionClient::api`].
//!
//! A failing step has already reported itself to the event sink when its
//! error propagates out of a chain; the chain adds no second report.

use std::sync::Arc;

use ows_api::{CreateCharacterResponse, PlayerGroup, UserSession, NO_GROUP};
use ows_core::{
    build_travel_url, Coordinates, Endpoint, TravelError, TravelPayload, ZoneServerLocation,
    LAST_ZONE,
};
use tracing::info;
use uuid::Uuid;

use crate::api::OwsApi;
use crate::config::{ClientConfig, Credentials};
use crate::error::{ApiError, Operation};
use crate::events::{ClientEvent, EventSink};
use crate::session::Session;
use crate::transport::HttpTransport;

/// Everything needed to hand a player over to a zone server.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTicket {
    /// The selected character's session, including its last position.
    pub session: UserSession,
    pub location: ZoneServerLocation,
    /// `host:port?ID=<token>`
    pub url: String,
}

/// Result of a login (or registration) chain.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub session_id: String,
    /// Present when the client is configured to advance automatically.
    pub ticket: Option<TravelTicket>,
}

/// Stateful OWS2 session client.
pub struct SessionClient {
    api: OwsApi,
    session: Session,
    selected_character: Option<String>,
    /// Set by a successful registration; the next advance creates a default
    /// character instead of listing existing ones.
    requires_character_creation: bool,
}

impl SessionClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::from_api(OwsApi::new(config, transport))
    }

    pub fn with_sink(self, sink: Arc<dyn EventSink>) -> Self {
        Self::from_api(self.api.with_sink(sink))
    }

    pub fn from_api(api: OwsApi) -> Self {
        let session = Session::new(api.config().customer_key.clone());
        Self {
            api,
            session,
            selected_character: None,
            requires_character_creation: false,
        }
    }

    /// Handle for calls that do not touch the session.
    pub fn api(&self) -> &OwsApi {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.session_id()
    }

    pub fn selected_character(&self) -> Option<&str> {
        self.selected_character.as_deref()
    }

    pub fn requires_character_creation(&self) -> bool {
        self.requires_character_creation
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Run the configured auto-register (which chains into login) or, failing
    /// that, the configured auto-login. Does nothing when neither is set.
    pub async fn start(&mut self) -> Result<Option<LoginOutcome>, ApiError> {
        let (auto_register, auto_login) = {
            let config = self.api.config();
            (config.auto_register.clone(), config.auto_login.clone())
        };
        if let Some(credentials) = auto_register {
            info!("session: auto-registering {}", credentials.email);
            return self.register(&credentials).await.map(Some);
        }
        if let Some(credentials) = auto_login {
            info!("session: auto-login for {}", credentials.email);
            return self
                .login(&credentials.email, &credentials.password)
                .await
                .map(Some);
        }
        Ok(None)
    }

    /// Register an account, then log in with the same credentials.
    pub async fn register(&mut self, credentials: &Credentials) -> Result<LoginOutcome, ApiError> {
        self.api.register(credentials).await?;
        self.login_inner(&credentials.email, &credentials.password, true)
            .await
    }

    /// Log in. The previous session is invalidated first, whatever the
    /// outcome. With `auto_advance` set, continues to a travel URL.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        self.login_inner(email, password, false).await
    }

    /// Only a login chained from a successful registration may create the
    /// default character; a failed login clears that state.
    async fn login_inner(
        &mut self,
        email: &str,
        password: &str,
        after_registration: bool,
    ) -> Result<LoginOutcome, ApiError> {
        self.session.invalidate();
        self.selected_character = None;
        self.requires_character_creation = false;

        let response = self.api.login(email, password).await?;
        self.session.establish(response.user_session_guid.clone());
        self.requires_character_creation = after_registration;

        let ticket = if self.api.config().auto_advance {
            Some(self.advance().await?)
        } else {
            None
        };
        Ok(LoginOutcome {
            session_id: response.user_session_guid,
            ticket,
        })
    }

    /// Pick a character and travel to its last zone.
    ///
    /// After a registration the character is created from the configured
    /// default set and named with a fresh UUID; otherwise the first listed
    /// character is used.
    pub async fn advance(&mut self) -> Result<TravelTicket, ApiError> {
        let character_name = if self.requires_character_creation {
            let endpoint = Endpoint::CreateCharacterUsingDefaultCharacterValues;
            let session_id = self.require_session(endpoint)?;
            self.requires_character_creation = false;
            let name = Uuid::now_v7().to_string();
            let set = self.api.config().default_character_set.clone();
            self.api
                .create_default_character(&session_id, &name, &set)
                .await?;
            name
        } else {
            let session_id = self.require_session(Endpoint::GetAllCharacters)?;
            let characters = self.api.list_characters(&session_id).await?;
            characters
                .into_iter()
                .next()
                .map(|c| c.character_name)
                .unwrap_or_default()
        };
        self.travel_to_last_zone(&character_name).await
    }

    /// Select `character_name` and travel to its last zone.
    pub async fn travel_to_last_zone(
        &mut self,
        character_name: &str,
    ) -> Result<TravelTicket, ApiError> {
        let session = self.select_character(character_name).await?;
        let location = self
            .api
            .resolve_zone_server(session.character_name(), LAST_ZONE, NO_GROUP)
            .await?;
        let url = self.travel_url_for(&location, session.coordinates())?;
        Ok(TravelTicket {
            session,
            location,
            url,
        })
    }

    /// Set the active character server-side and fetch its last position.
    pub async fn select_character(&mut self, character_name: &str) -> Result<UserSession, ApiError> {
        let session_id = self.require_session(Endpoint::SetSelectedCharacterAndGetUserSession)?;
        let session = self.api.select_character(&session_id, character_name).await?;
        self.selected_character = Some(session.character_name().to_string());
        Ok(session)
    }

    /// Resolve a named zone for the selected character and build a travel URL
    /// that places it at `coordinates`.
    pub async fn travel_to_zone(
        &mut self,
        zone_name: &str,
        coordinates: Coordinates,
    ) -> Result<String, ApiError> {
        let endpoint = Endpoint::GetServerToConnectTo;
        let character = self.require_character(endpoint.into())?;
        let location = self
            .api
            .resolve_zone_server(&character, zone_name, NO_GROUP)
            .await?;
        self.travel_url_for(&location, coordinates)
    }

    /// Build a travel URL for the current session and selected character.
    ///
    /// Requires an authenticated session with a non-empty id. Reports
    /// [`ClientEvent::TravelReady`] on success.
    pub fn travel_url_for(
        &self,
        location: &ZoneServerLocation,
        coordinates: Coordinates,
    ) -> Result<String, ApiError> {
        let result = self.build_url(location, coordinates);
        self.api
            .report(result, |url| ClientEvent::TravelReady { url: url.clone() })
    }

    fn build_url(
        &self,
        location: &ZoneServerLocation,
        coordinates: Coordinates,
    ) -> Result<String, ApiError> {
        let operation = Operation::BuildTravelUrl;
        let session_id = self
            .session
            .session_id()
            .ok_or_else(|| ApiError::validation(operation, "not logged in"))?;
        let character = self
            .selected_character
            .as_deref()
            .ok_or_else(|| ApiError::validation(operation, "no character selected"))?;

        let payload = TravelPayload::new(coordinates, character, session_id);
        build_travel_url(location, &payload, &self.api.config().encryption_key).map_err(|e| {
            match e {
                TravelError::Encryption(_) => ApiError::serialization(operation, e),
                other => ApiError::validation(operation, other.to_string()),
            }
        })
    }

    // -----------------------------------------------------------------------
    // Session-scoped calls
    // -----------------------------------------------------------------------

    /// Log the selected character out, then drop the session.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let character = self.require_character(Endpoint::PlayerLogout.into())?;
        self.api.player_logout(&character).await?;
        self.session.invalidate();
        self.selected_character = None;
        Ok(())
    }

    pub async fn create_character(
        &self,
        character_name: &str,
        class_name: &str,
    ) -> Result<CreateCharacterResponse, ApiError> {
        let session_id = self.require_session(Endpoint::CreateCharacter)?;
        self.api
            .create_character(&session_id, character_name, class_name)
            .await
    }

    pub async fn remove_character(&mut self, character_name: &str) -> Result<(), ApiError> {
        let session_id = self.require_session(Endpoint::RemoveCharacter)?;
        self.api
            .remove_character(&session_id, character_name)
            .await?;
        if self.selected_character.as_deref() == Some(character_name) {
            self.selected_character = None;
        }
        Ok(())
    }

    /// Groups of the given type that the selected character belongs to.
    pub async fn player_groups(&self, player_group_type_id: i32) -> Result<Vec<PlayerGroup>, ApiError> {
        let endpoint = Endpoint::GetPlayerGroupsCharacterIsIn;
        let session_id = self.require_session(endpoint)?;
        let character = self.require_character(endpoint.into())?;
        self.api
            .player_groups(&session_id, &character, player_group_type_id)
            .await
    }

    // -----------------------------------------------------------------------
    // Preconditions
    // -----------------------------------------------------------------------

    /// The session id, or a reported `Validation` error for `endpoint`.
    fn require_session(&self, endpoint: Endpoint) -> Result<String, ApiError> {
        match self.session.session_id() {
            Some(id) => Ok(id.to_string()),
            None => Err(self.fail(ApiError::validation(endpoint, "not logged in"))),
        }
    }

    fn require_character(&self, operation: Operation) -> Result<String, ApiError> {
        match self.selected_character.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(self.fail(ApiError::validation(operation, "no character selected"))),
        }
    }

    fn fail(&self, error: ApiError) -> ApiError {
        self.api.sink().on_error(&error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::events::{ChannelSink, Notification};
    use crate::transport::scripted::ScriptedTransport;
    use crate::transport::TransportError;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn client_with(
        config: ClientConfig,
    ) -> (SessionClient, Arc<ScriptedTransport>, UnboundedReceiver<Notification>) {
        let transport = Arc::new(ScriptedTransport::new());
        let (sink, rx) = ChannelSink::new();
        let client = SessionClient::new(config, transport.clone()).with_sink(Arc::new(sink));
        (client, transport, rx)
    }

    fn config() -> ClientConfig {
        ClientConfig::new("http://ows.test/", "cust", "mykey")
    }

    fn manual_config() -> ClientConfig {
        ClientConfig {
            auto_advance: false,
            ..config()
        }
    }

    fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    fn login_ok(transport: &ScriptedTransport, session_id: &str) {
        transport.reply_json(json!({
            "Authenticated": true, "UserSessionGUID": session_id, "ErrorMessage": ""
        }));
    }

    fn select_and_resolve(transport: &ScriptedTransport, name: &str) {
        transport
            .reply_json(json!({
                "UserSessionGUID": "sess-1", "CharName": name, "ZoneName": "Town",
                "X": 10, "Y": 20, "Z": 30, "RX": 0, "RY": 0, "RZ": 0
            }))
            .reply_json(json!({"serverip": "10.0.0.5", "port": "7777"}));
    }

    #[tokio::test]
    async fn login_chain_produces_travel_url() {
        let (mut client, transport, mut rx) = client_with(config());
        login_ok(&transport, "sess-1");
        transport.reply_json(json!([{"CharacterName": "Hero"}, {"CharacterName": "Alt"}]));
        select_and_resolve(&transport, "Hero");

        let outcome = client.login("a@b.c", "pw").await.unwrap();
        let ticket = outcome.ticket.unwrap();

        let token = ows_core::encrypt("10.0|20.0|30.0|0.0|0.0|0.0|Hero|sess-1", "mykey");
        assert_eq!(ticket.url, format!("10.0.0.5:7777?ID={token}"));
        assert_eq!(ticket.location, ZoneServerLocation::new("10.0.0.5", "7777"));
        assert_eq!(client.session_id(), Some("sess-1"));
        assert_eq!(client.selected_character(), Some("Hero"));

        assert_eq!(
            transport.paths(),
            vec![
                "api/Users/LoginAndCreateSession",
                "api/Users/GetAllCharacters",
                "api/Users/SetSelectedCharacterAndGetUserSession",
                "api/Users/GetServerToConnectTo",
            ]
        );

        let notes = drain(&mut rx);
        assert_eq!(notes.len(), 5);
        assert!(notes.iter().all(|n| matches!(n, Notification::Success(_))));
        assert_eq!(
            notes[4],
            Notification::Success(ClientEvent::TravelReady { url: ticket.url })
        );
    }

    #[tokio::test]
    async fn register_fires_exactly_one_login() {
        let (mut client, transport, _rx) = client_with(manual_config());
        transport.reply_json(json!({"ErrorMessage": ""}));
        login_ok(&transport, "sess-1");

        let creds = Credentials::new("a@b.c", "pw").with_name("Ada", "L");
        let outcome = client.register(&creds).await.unwrap();
        assert_eq!(outcome.session_id, "sess-1");
        assert!(outcome.ticket.is_none());
        assert!(client.requires_character_creation());

        let requests = transport.requests();
        assert_eq!(
            transport.paths(),
            vec!["api/Users/RegisterUser", "api/Users/LoginAndCreateSession"]
        );
        assert_eq!(requests[1].body, r#"{"email":"a@b.c","password":"pw"}"#);
    }

    #[tokio::test]
    async fn registration_chain_creates_default_character() {
        let (mut client, transport, _rx) = client_with(config());
        transport.reply_json(json!({"ErrorMessage": ""}));
        login_ok(&transport, "sess-1");
        transport.reply_json(json!({"CharacterName": "ignored", "ErrorMessage": ""}));
        select_and_resolve(&transport, "Newcomer");

        let outcome = client
            .register(&Credentials::new("a@b.c", "pw"))
            .await
            .unwrap();
        assert!(outcome.ticket.is_some());
        assert!(!client.requires_character_creation());
        assert_eq!(client.selected_character(), Some("Newcomer"));

        assert_eq!(
            transport.paths(),
            vec![
                "api/Users/RegisterUser",
                "api/Users/LoginAndCreateSession",
                "api/Users/CreateCharacterUsingDefaultCharacterValues",
                "api/Users/SetSelectedCharacterAndGetUserSession",
                "api/Users/GetServerToConnectTo",
            ]
        );
        let create: serde_json::Value =
            serde_json::from_str(&transport.requests()[2].body).unwrap();
        assert_eq!(create["defaultSetName"], "Default");
        assert_eq!(create["userSessionGUID"], "sess-1");
        let name = create["characterName"].as_str().unwrap();
        assert!(Uuid::parse_str(name).is_ok());
    }

    #[tokio::test]
    async fn failed_chained_login_does_not_leak_character_creation() {
        let (mut client, transport, _rx) = client_with(config());
        transport
            .reply_json(json!({"ErrorMessage": ""}))
            .fail(TransportError::Timeout);
        let err = client
            .register(&Credentials::new("new@b.c", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport(TransportError::Timeout));
        assert!(!client.requires_character_creation());

        login_ok(&transport, "sess-2");
        transport.reply_json(json!([{"CharacterName": "Veteran"}]));
        select_and_resolve(&transport, "Veteran");
        client.login("veteran@b.c", "pw").await.unwrap();

        assert_eq!(
            transport.paths(),
            vec![
                "api/Users/RegisterUser",
                "api/Users/LoginAndCreateSession",
                "api/Users/LoginAndCreateSession",
                "api/Users/GetAllCharacters",
                "api/Users/SetSelectedCharacterAndGetUserSession",
                "api/Users/GetServerToConnectTo",
            ]
        );
    }

    #[tokio::test]
    async fn plain_login_after_registration_lists_characters() {
        let (mut client, transport, _rx) = client_with(manual_config());
        transport.reply_json(json!({"ErrorMessage": ""}));
        login_ok(&transport, "sess-1");
        client
            .register(&Credentials::new("new@b.c", "pw"))
            .await
            .unwrap();
        assert!(client.requires_character_creation());

        login_ok(&transport, "sess-2");
        client.login("other@b.c", "pw").await.unwrap();
        assert!(!client.requires_character_creation());
    }

    #[tokio::test]
    async fn failed_registration_does_not_login() {
        let (mut client, transport, mut rx) = client_with(config());
        transport.reply_json(json!({"ErrorMessage": "Email already in use"}));

        let err = client
            .register(&Credentials::new("a@b.c", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Application("Email already in use".into()));
        assert_eq!(transport.requests().len(), 1);
        assert!(!client.requires_character_creation());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn empty_character_list_stops_chain() {
        let (mut client, transport, mut rx) = client_with(config());
        login_ok(&transport, "sess-1");
        transport.reply_json(json!([]));

        let err = client.login("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Validation(_)));
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(client.session_id(), Some("sess-1"));

        let notes = drain(&mut rx);
        assert_eq!(notes.len(), 2);
        assert!(matches!(notes[1], Notification::Error(_)));
    }

    #[tokio::test]
    async fn new_login_invalidates_previous_session() {
        let (mut client, transport, _rx) = client_with(manual_config());
        login_ok(&transport, "sess-1");
        client.login("a@b.c", "pw").await.unwrap();
        assert_eq!(client.session_id(), Some("sess-1"));

        transport.reply_json(json!({"Authenticated": false, "ErrorMessage": "Locked"}));
        client.login("a@b.c", "pw").await.unwrap_err();
        assert_eq!(client.session_id(), None);
    }

    #[tokio::test]
    async fn travel_url_requires_login() {
        let (client, transport, mut rx) = client_with(config());
        let err = client
            .travel_url_for(
                &ZoneServerLocation::new("10.0.0.5", "7777"),
                Coordinates::default(),
            )
            .unwrap_err();
        assert_eq!(err.operation, Operation::BuildTravelUrl);
        assert!(matches!(err.kind, ErrorKind::Validation(_)));
        assert!(transport.requests().is_empty());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn missing_encryption_key_fails_url() {
        let (mut client, transport, _rx) =
            client_with(ClientConfig::new("http://ows.test/", "cust", ""));
        login_ok(&transport, "sess-1");
        transport.reply_json(json!([{"CharacterName": "Hero"}]));
        select_and_resolve(&transport, "Hero");

        let err = client.login("a@b.c", "pw").await.unwrap_err();
        assert_eq!(err.operation, Operation::BuildTravelUrl);
        assert!(matches!(err.kind, ErrorKind::Serialization(_)));
    }

    #[tokio::test]
    async fn travel_to_named_zone() {
        let (mut client, transport, _rx) = client_with(config());
        login_ok(&transport, "sess-1");
        transport.reply_json(json!([{"CharacterName": "Hero"}]));
        select_and_resolve(&transport, "Hero");
        client.login("a@b.c", "pw").await.unwrap();

        transport.reply_json(json!({"serverip": "10.0.0.9", "port": 7778}));
        let url = client
            .travel_to_zone("Dungeon", Coordinates::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0))
            .await
            .unwrap();
        let token = ows_core::encrypt("1.0|2.0|3.0|0.0|0.0|0.0|Hero|sess-1", "mykey");
        assert_eq!(url, format!("10.0.0.9:7778?ID={token}"));

        let body: serde_json::Value =
            serde_json::from_str(&transport.requests()[4].body).unwrap();
        assert_eq!(body["zoneName"], "Dungeon");
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (mut client, transport, _rx) = client_with(config());
        login_ok(&transport, "sess-1");
        transport.reply_json(json!([{"CharacterName": "Hero"}]));
        select_and_resolve(&transport, "Hero");
        client.login("a@b.c", "pw").await.unwrap();

        transport.reply_json(json!({}));
        client.logout().await.unwrap();
        assert_eq!(client.session_id(), None);
        assert_eq!(client.selected_character(), None);
        assert_eq!(
            transport.paths().last().map(String::as_str),
            Some("api/Characters/PlayerLogout")
        );
    }

    #[tokio::test]
    async fn logout_without_character_is_rejected() {
        let (mut client, transport, _rx) = client_with(config());
        let err = client.logout().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn start_runs_auto_login() {
        let config = ClientConfig {
            auto_login: Some(Credentials::new("a@b.c", "pw")),
            ..manual_config()
        };
        let (mut client, transport, _rx) = client_with(config);
        login_ok(&transport, "sess-1");

        let outcome = client.start().await.unwrap().unwrap();
        assert_eq!(outcome.session_id, "sess-1");
        assert_eq!(transport.paths(), vec!["api/Users/LoginAndCreateSession"]);
    }

    #[tokio::test]
    async fn start_without_auto_flags_does_nothing() {
        let (mut client, transport, _rx) = client_with(config());
        assert!(client.start().await.unwrap().is_none());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn remove_selected_character_clears_selection() {
        let (mut client, transport, _rx) = client_with(config());
        login_ok(&transport, "sess-1");
        transport.reply_json(json!([{"CharacterName": "Hero"}]));
        select_and_resolve(&transport, "Hero");
        client.login("a@b.c", "pw").await.unwrap();

        transport.reply_json(json!({"Success": true, "ErrorMessage": ""}));
        client.remove_character("Hero").await.unwrap();
        assert_eq!(client.selected_character(), None);
    }
}
