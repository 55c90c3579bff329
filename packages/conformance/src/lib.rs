//! Shared helpers for the OWS2 client conformance suite.
//!
//! Provides [`spawn_backend`], which binds a `TcpListener` on an ephemeral
//! port, serves an in-process fake of the OWS2 persistence API on it, and
//! returns both the base URL and the [`FakeBackend`] state so tests can seed
//! accounts and inspect what the client sent.
//!
//! The fake answers in PascalCase like the real backend (`UserSessionGUID`,
//! `CharName`, `X`) and reads the camelCase bodies the client sends. Every
//! request must carry `X-CustomerGUID: `[`CUSTOMER_KEY`]; anything else is
//! rejected with `401` before routing.
//!
//! # Routes
//!
//! | Path | Behaviour |
//! |------|-----------|
//! | `api/Users/LoginAndCreateSession` | new session GUID, or `ErrorMessage` on bad credentials |
//! | `api/Users/RegisterUser` | creates the account; `ErrorMessage` if the email is taken |
//! | `api/Users/GetAllCharacters` | the session's characters |
//! | `api/Users/CreateCharacter` | adds a character of the given class |
//! | `api/Users/CreateCharacterUsingDefaultCharacterValues` | adds a character at the start position |
//! | `api/Users/RemoveCharacter` | removes a character |
//! | `api/Users/SetSelectedCharacterAndGetUserSession` | selects and returns the last position |
//! | `api/Users/GetServerToConnectTo` | the zone server for a zone, or the character's last zone |
//! | `api/Users/GetPlayerGroupsCharacterIsIn` | always an empty group list |
//! | `api/Characters/PlayerLogout` | clears the selection, empty body |

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

/// Customer key every request must present.
pub const CUSTOMER_KEY: &str = "conformance-customer";

/// Zone every new character starts in.
pub const START_ZONE: &str = "StartZone";

/// Zone name that resolves to the character's last zone.
const LAST_ZONE: &str = "GETLASTZONENAME";

const EMPTY_GUID: &str = "00000000-0000-0000-0000-000000000000";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A character as the backend stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub name: String,
    pub class_name: String,
    pub zone_name: String,
    /// X, Y, Z, RX, RY, RZ.
    pub position: [f32; 6],
}

impl Character {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            zone_name: START_ZONE.into(),
            position: [0.0, 0.0, 250.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn at(mut self, zone_name: impl Into<String>, position: [f32; 6]) -> Self {
        self.zone_name = zone_name.into();
        self.position = position;
        self
    }
}

struct Account {
    password: String,
    characters: Vec<Character>,
}

struct Inner {
    accounts: HashMap<String, Account>,
    /// Session GUID → account email.
    sessions: HashMap<String, String>,
    /// Session GUID → selected character.
    selected: HashMap<String, String>,
    /// Zone name → (host, port).
    zones: HashMap<String, (String, u16)>,
    /// Path of every request that passed the customer key check.
    requests: Vec<String>,
}

/// State of the fake backend, shared between the server task and the test.
pub struct FakeBackend {
    inner: RwLock<Inner>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    /// An empty backend whose [`START_ZONE`] is served at `10.0.0.5:7777`.
    pub fn new() -> Self {
        let mut zones = HashMap::new();
        zones.insert(START_ZONE.to_string(), ("10.0.0.5".to_string(), 7777));
        Self {
            inner: RwLock::new(Inner {
                accounts: HashMap::new(),
                sessions: HashMap::new(),
                selected: HashMap::new(),
                zones,
                requests: Vec::new(),
            }),
        }
    }

    pub fn add_account(&self, email: &str, password: &str) {
        self.inner.write().unwrap().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                characters: Vec::new(),
            },
        );
    }

    pub fn add_character(&self, email: &str, character: Character) {
        if let Some(account) = self.inner.write().unwrap().accounts.get_mut(email) {
            account.characters.push(character);
        }
    }

    pub fn add_zone(&self, zone_name: &str, host: &str, port: u16) {
        self.inner
            .write()
            .unwrap()
            .zones
            .insert(zone_name.to_string(), (host.to_string(), port));
    }

    pub fn characters(&self, email: &str) -> Vec<Character> {
        self.inner
            .read()
            .unwrap()
            .accounts
            .get(email)
            .map(|a| a.characters.clone())
            .unwrap_or_default()
    }

    /// Paths (`api/...`) of all accepted requests, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.inner.read().unwrap().requests.clone()
    }

    pub fn session_count(&self) -> usize {
        self.inner.read().unwrap().sessions.len()
    }

    /// The character selected in `session_id`, if any.
    pub fn selected(&self, session_id: &str) -> Option<String> {
        self.inner.read().unwrap().selected.get(session_id).cloned()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Start an ephemeral fake backend and return `(base_url, backend)`.
///
/// The server runs in a background `tokio` task bound to an OS-assigned port
/// on `127.0.0.1`. The returned base URL ends with `/`, e.g.
/// `http://127.0.0.1:51234/`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_backend() -> (String, Arc<FakeBackend>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}/");

    let backend = Arc::new(FakeBackend::new());
    let router = build_router(Arc::clone(&backend));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("fake backend error");
    });

    (base_url, backend)
}

/// Build the fake backend's router.
pub fn build_router(backend: Arc<FakeBackend>) -> Router {
    Router::new()
        .route("/api/Users/LoginAndCreateSession", post(login))
        .route("/api/Users/RegisterUser", post(register))
        .route("/api/Users/GetAllCharacters", post(list_characters))
        .route("/api/Users/CreateCharacter", post(create_character))
        .route(
            "/api/Users/CreateCharacterUsingDefaultCharacterValues",
            post(create_default_character),
        )
        .route("/api/Users/RemoveCharacter", post(remove_character))
        .route(
            "/api/Users/SetSelectedCharacterAndGetUserSession",
            post(select_character),
        )
        .route("/api/Users/GetServerToConnectTo", post(server_to_connect_to))
        .route(
            "/api/Users/GetPlayerGroupsCharacterIsIn",
            post(player_groups),
        )
        .route("/api/Characters/PlayerLogout", post(player_logout))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&backend),
            require_customer_key,
        ))
        .with_state(backend)
}

async fn require_customer_key(
    State(backend): State<Arc<FakeBackend>>,
    req: Request,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get("X-CustomerGUID")
        .is_some_and(|v| v.as_bytes() == CUSTOMER_KEY.as_bytes());
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let path = req.uri().path().trim_start_matches('/').to_string();
    backend.inner.write().unwrap().requests.push(path);
    next.run(req).await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type Shared = State<Arc<FakeBackend>>;

fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn error(message: &str) -> Json<Value> {
    Json(json!({ "ErrorMessage": message }))
}

async fn login(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let email = field(&body, "email");
    let password = field(&body, "password");
    let mut inner = backend.inner.write().unwrap();

    let valid = inner
        .accounts
        .get(email)
        .is_some_and(|a| a.password == password);
    if !valid {
        return Json(json!({
            "Authenticated": false,
            "UserSessionGUID": EMPTY_GUID,
            "ErrorMessage": "Username or Password is invalid!"
        }));
    }

    let session_id = uuid::Uuid::now_v7().to_string();
    inner.sessions.insert(session_id.clone(), email.to_string());
    Json(json!({
        "Authenticated": true,
        "UserSessionGUID": session_id,
        "ErrorMessage": ""
    }))
}

async fn register(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let email = field(&body, "email");
    let password = field(&body, "password");
    if email.is_empty() || password.is_empty() {
        return error("Email and password are required");
    }

    let mut inner = backend.inner.write().unwrap();
    if inner.accounts.contains_key(email) {
        return error("Email already registered");
    }
    inner.accounts.insert(
        email.to_string(),
        Account {
            password: password.to_string(),
            characters: Vec::new(),
        },
    );
    Json(json!({ "Authenticated": false, "UserSessionGUID": EMPTY_GUID, "ErrorMessage": "" }))
}

async fn list_characters(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let inner = backend.inner.read().unwrap();
    let Some(account) = inner.account_for(field(&body, "userSessionGUID")) else {
        return error("Invalid session");
    };
    let rows: Vec<Value> = account
        .characters
        .iter()
        .map(|c| {
            json!({
                "CharacterName": c.name,
                "ClassName": c.class_name,
                "Level": 1,
                "Gender": 0,
                "ZoneName": c.zone_name
            })
        })
        .collect();
    Json(Value::Array(rows))
}

async fn create_character(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let name = field(&body, "characterName");
    let class_name = field(&body, "className");
    add_character(&backend, field(&body, "userSessionGUID"), Character::new(name, class_name))
}

async fn create_default_character(
    State(backend): Shared,
    Json(body): Json<Value>,
) -> Json<Value> {
    let name = field(&body, "characterName");
    let class_name = match field(&body, "defaultSetName") {
        "" => "Default",
        set => set,
    };
    add_character(&backend, field(&body, "userSessionGUID"), Character::new(name, class_name))
}

fn add_character(backend: &FakeBackend, session_id: &str, character: Character) -> Json<Value> {
    if character.name.is_empty() {
        return error("Character name is required");
    }
    let mut inner = backend.inner.write().unwrap();
    if inner
        .accounts
        .values()
        .any(|a| a.characters.iter().any(|c| c.name == character.name))
    {
        return error("Character Name already in use");
    }
    let Some(account) = inner.account_for_mut(session_id) else {
        return error("Invalid session");
    };
    let response = json!({
        "CharacterName": character.name,
        "ClassName": character.class_name,
        "ErrorMessage": ""
    });
    account.characters.push(character);
    Json(response)
}

async fn remove_character(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let name = field(&body, "characterName");
    let mut inner = backend.inner.write().unwrap();
    let Some(account) = inner.account_for_mut(field(&body, "userSessionGUID")) else {
        return error("Invalid session");
    };
    let before = account.characters.len();
    account.characters.retain(|c| c.name != name);
    if account.characters.len() == before {
        return Json(json!({ "Success": false, "ErrorMessage": "Character not found" }));
    }
    Json(json!({ "Success": true, "ErrorMessage": "" }))
}

async fn select_character(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let session_id = field(&body, "userSessionGUID");
    let name = field(&body, "selectedCharacterName");
    let mut inner = backend.inner.write().unwrap();

    let character = match inner.account_for(session_id) {
        None => return error("Invalid session"),
        Some(account) => match account.characters.iter().find(|c| c.name == name) {
            Some(c) => c.clone(),
            None => return error("Character not found"),
        },
    };
    inner
        .selected
        .insert(session_id.to_string(), character.name.clone());

    let [x, y, z, rx, ry, rz] = character.position;
    Json(json!({
        "UserSessionGUID": session_id,
        "SelectedCharacterName": character.name,
        "CharName": character.name,
        "ZoneName": character.zone_name,
        "X": x, "Y": y, "Z": z,
        "RX": rx, "RY": ry, "RZ": rz,
        "ErrorMessage": ""
    }))
}

async fn server_to_connect_to(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let name = field(&body, "characterName");
    let inner = backend.inner.read().unwrap();

    let zone_name = match field(&body, "zoneName") {
        LAST_ZONE => inner
            .accounts
            .values()
            .flat_map(|a| a.characters.iter())
            .find(|c| c.name == name)
            .map(|c| c.zone_name.clone())
            .unwrap_or_default(),
        zone => zone.to_string(),
    };
    match inner.zones.get(&zone_name) {
        Some((host, port)) => Json(json!({ "serverip": host, "port": port })),
        None => Json(json!({ "serverip": "", "port": 0 })),
    }
}

async fn player_groups(State(backend): Shared, Json(body): Json<Value>) -> Json<Value> {
    let inner = backend.inner.read().unwrap();
    if inner.account_for(field(&body, "userSessionGUID")).is_none() {
        return Json(json!({ "success": "false", "errmsg": "Invalid session" }));
    }
    Json(json!({ "success": "true", "rows": [], "errmsg": "" }))
}

async fn player_logout(State(backend): Shared, Json(body): Json<Value>) -> StatusCode {
    let name = field(&body, "characterName");
    backend
        .inner
        .write()
        .unwrap()
        .selected
        .retain(|_, selected| selected != name);
    StatusCode::OK
}

impl Inner {
    fn account_for(&self, session_id: &str) -> Option<&Account> {
        self.sessions
            .get(session_id)
            .and_then(|email| self.accounts.get(email))
    }

    fn account_for_mut(&mut self, session_id: &str) -> Option<&mut Account> {
        let email = self.sessions.get(session_id)?;
        self.accounts.get_mut(email)
    }
}
