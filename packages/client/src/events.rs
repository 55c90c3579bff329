//! Success and error notifications.
//!
//! Every public client operation reports its outcome to an [`EventSink`]
//! exactly once: one [`EventSink::on_success`] or one [`EventSink::on_error`],
//! never both and never neither. The same outcome is also returned to the
//! caller as a `Result`, so the sink is for observers (UI, logs, tests) rather
//! than for control flow.

use ows_api::{Ability, AbilityBar, CreateCharacterResponse, PlayerGroup, UserCharacter, UserSession};
use ows_core::ZoneServerLocation;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// A successful outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    Registered { email: String },
    LoggedIn { session_id: String },
    CharactersListed { characters: Vec<UserCharacter> },
    CharacterCreated { character: CreateCharacterResponse },
    CharacterRemoved { character_name: String },
    CharacterSelected { session: UserSession },
    ZoneServerResolved { location: ZoneServerLocation },
    TravelReady { url: String },
    PlayerGroupsListed { groups: Vec<PlayerGroup> },
    CharacterStats { data: Value },
    CharacterData { data: Value },
    CustomDataLoaded { data: Value },
    StatsUpdated,
    AbilitiesListed { abilities: Vec<Ability> },
    AbilityBarsListed { bars: Vec<AbilityBar> },
    LoggedOut { character_name: String },
    /// A call whose only result is "it worked".
    Completed { operation: String },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Registered { .. } => "registered",
            ClientEvent::LoggedIn { .. } => "logged_in",
            ClientEvent::CharactersListed { .. } => "characters_listed",
            ClientEvent::CharacterCreated { .. } => "character_created",
            ClientEvent::CharacterRemoved { .. } => "character_removed",
            ClientEvent::CharacterSelected { .. } => "character_selected",
            ClientEvent::ZoneServerResolved { .. } => "zone_server_resolved",
            ClientEvent::TravelReady { .. } => "travel_ready",
            ClientEvent::PlayerGroupsListed { .. } => "player_groups_listed",
            ClientEvent::CharacterStats { .. } => "character_stats",
            ClientEvent::CharacterData { .. } => "character_data",
            ClientEvent::CustomDataLoaded { .. } => "custom_data_loaded",
            ClientEvent::StatsUpdated => "stats_updated",
            ClientEvent::AbilitiesListed { .. } => "abilities_listed",
            ClientEvent::AbilityBarsListed { .. } => "ability_bars_listed",
            ClientEvent::LoggedOut { .. } => "logged_out",
            ClientEvent::Completed { .. } => "completed",
        }
    }
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Receives the outcome of every client operation.
pub trait EventSink: Send + Sync + 'static {
    fn on_success(&self, event: &ClientEvent);
    fn on_error(&self, error: &ApiError);
}

/// Logs every notification. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_success(&self, event: &ClientEvent) {
        match event {
            ClientEvent::LoggedIn { session_id } => info!("session: logged in ({session_id})"),
            ClientEvent::TravelReady { url } => info!("session: travel url ready: {url}"),
            other => info!("session: {}", other.name()),
        }
        debug!("session: event {event:?}");
    }

    fn on_error(&self, error: &ApiError) {
        warn!("session: {error}");
    }
}

/// One delivered notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Success(ClientEvent),
    Error(ApiError),
}

/// Forwards notifications into an unbounded channel.
///
/// A dropped receiver is not an error; notifications are then discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn on_success(&self, event: &ClientEvent) {
        let _ = self.tx.send(Notification::Success(event.clone()));
    }

    fn on_error(&self, error: &ApiError) {
        let _ = self.tx.send(Notification::Error(error.clone()));
    }
}
