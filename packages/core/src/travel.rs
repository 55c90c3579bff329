//! Travel payloads and travel URLs.
//!
//! A travel URL tells a game client which zone server to join and carries an
//! encrypted token proving who is joining and where they stand:
//!
//! ```text
//! 10.0.0.5:7777?ID=305F4777BB92341893A839CA731A4A98...
//! ```
//!
//! The token is [`TravelPayload::canonical`] encrypted with the
//! [`codec`](crate::codec).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use urlencoding::{decode, encode};

use crate::codec::{self, CodecError};

/// Zone name that asks the backend for the character's last zone.
pub const LAST_ZONE: &str = "GETLASTZONENAME";

/// Query parameter that carries the encrypted token.
pub const TOKEN_PARAM: &str = "ID";

/// Errors raised while building or parsing travel data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TravelError {
    #[error("session id must not be empty")]
    EmptySessionId,

    #[error("character name must not be empty")]
    EmptyCharacterName,

    #[error("zone server host and port must not be empty")]
    IncompleteServerLocation,

    #[error("travel token encryption failed: {0}")]
    Encryption(#[from] CodecError),

    #[error("malformed travel payload: {0}")]
    MalformedPayload(String),
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// World position and rotation of a character.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rx: f32,
    pub ry: f32,
    pub rz: f32,
}

impl Coordinates {
    pub fn new(x: f32, y: f32, z: f32, rx: f32, ry: f32, rz: f32) -> Self {
        Self { x, y, z, rx, ry, rz }
    }

    fn components(&self) -> [f32; 6] {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
    }
}

// ---------------------------------------------------------------------------
// TravelPayload
// ---------------------------------------------------------------------------

/// Everything a zone server needs to admit a character.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelPayload {
    pub coordinates: Coordinates,
    pub character_name: String,
    pub session_id: String,
}

impl TravelPayload {
    pub fn new(
        coordinates: Coordinates,
        character_name: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            coordinates,
            character_name: character_name.into(),
            session_id: session_id.into(),
        }
    }

    /// `x|y|z|rx|ry|rz|urlEncode(characterName)|sessionId`
    ///
    /// Coordinates are rendered with [`render_float`].
    pub fn canonical(&self) -> String {
        let mut fields: Vec<String> = self
            .coordinates
            .components()
            .iter()
            .map(|v| render_float(*v))
            .collect();
        fields.push(encode(&self.character_name).into_owned());
        fields.push(self.session_id.clone());
        fields.join("|")
    }

    /// Check the identity fields a zone server requires.
    pub fn validate(&self) -> Result<(), TravelError> {
        if self.character_name.is_empty() {
            return Err(TravelError::EmptyCharacterName);
        }
        if self.session_id.is_empty() {
            return Err(TravelError::EmptySessionId);
        }
        Ok(())
    }

    /// Encrypt the canonical form into an uppercase hex token.
    pub fn seal(&self, key: &str) -> Result<String, TravelError> {
        self.validate()?;
        Ok(codec::try_encrypt(&self.canonical(), key)?)
    }
}

/// Parses the canonical form, as a zone server does after decrypting.
impl FromStr for TravelPayload {
    type Err = TravelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('|').collect();
        if fields.len() != 8 {
            return Err(TravelError::MalformedPayload(format!(
                "expected 8 fields, got {}",
                fields.len()
            )));
        }

        let mut numbers = [0f32; 6];
        for (slot, raw) in numbers.iter_mut().zip(&fields[..6]) {
            *slot = raw
                .parse()
                .map_err(|_| TravelError::MalformedPayload(format!("bad coordinate {raw:?}")))?;
        }
        let [x, y, z, rx, ry, rz] = numbers;

        let character_name = decode(fields[6])
            .map_err(|e| TravelError::MalformedPayload(format!("bad character name: {e}")))?
            .into_owned();

        Ok(Self {
            coordinates: Coordinates::new(x, y, z, rx, ry, rz),
            character_name,
            session_id: fields[7].to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// ZoneServerLocation
// ---------------------------------------------------------------------------

/// The physical server hosting a zone instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneServerLocation {
    pub host: String,
    pub port: String,
}

impl ZoneServerLocation {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// True when both host and port are present.
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && !self.port.trim().is_empty()
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port.trim())
    }
}

impl fmt::Display for ZoneServerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

// ---------------------------------------------------------------------------
// Travel URL
// ---------------------------------------------------------------------------

/// Build `host:port?ID=<token>` for `payload`, encrypted with `key`.
pub fn build_travel_url(
    location: &ZoneServerLocation,
    payload: &TravelPayload,
    key: &str,
) -> Result<String, TravelError> {
    if !location.is_complete() {
        return Err(TravelError::IncompleteServerLocation);
    }
    let token = payload.seal(key)?;
    Ok(format!(
        "{}?{}={}",
        location.address(),
        TOKEN_PARAM,
        encode(&token)
    ))
}

/// Extract the token from a travel URL, if present.
pub fn token_from_url(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == TOKEN_PARAM).then_some(value)
    })
}

/// Render a coordinate the way zone servers expect it: up to six fractional
/// digits, trailing zeros trimmed, at least one fractional digit kept.
///
/// `10.0` renders as `"10.0"`, `0.25` as `"0.25"`, `-3.5` as `"-3.5"`.
pub fn render_float(value: f32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.6}", f64::from(value));
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
