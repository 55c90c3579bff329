//! Authenticated session client for the OWS2 persistence backend.
//!
//! Two layers:
//!
//! - [`OwsApi`] is a stateless, cloneable handle with one method per backend
//!   endpoint. Every call posts a JSON body, checks for a server-reported
//!   error and decodes the response, reporting its outcome to an
//!   [`EventSink`].
//! - [`SessionClient`] owns the [`Session`] and sequences calls into the
//!   register → login → select → travel chain.
//!
//! HTTP goes through the [`HttpTransport`] trait: [`ReqwestTransport`] in
//! production, [`ScriptedTransport`] in tests.
//!
//! # Module layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | [`ClientConfig`] from code or `OWS_*` environment variables |
//! | [`transport`] | [`HttpTransport`] trait and its implementations |
//! | [`api`] | [`OwsApi`] endpoint calls |
//! | [`client`] | [`SessionClient`] protocol chains |
//! | [`session`] | [`Session`] authentication context |
//! | [`events`] | [`ClientEvent`] and the [`EventSink`] implementations |
//! | [`error`] | [`ApiError`] = [`Operation`] + [`ErrorKind`] |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ows_client::{ClientConfig, ReqwestTransport, SessionClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
//! let mut client = SessionClient::new(config, transport);
//!
//! let outcome = client.login("player@example.com", "secret").await?;
//! if let Some(ticket) = outcome.ticket {
//!     println!("travel to {}", ticket.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod transport;

pub use api::OwsApi;
pub use client::{LoginOutcome, SessionClient, TravelTicket};
pub use config::{ClientConfig, ConfigError, Credentials};
pub use error::{ApiError, ErrorKind, Operation};
pub use events::{ChannelSink, ClientEvent, EventSink, Notification, TracingSink};
pub use session::Session;
pub use transport::http::ReqwestTransport;
pub use transport::scripted::ScriptedTransport;
pub use transport::{HttpResponse, HttpTransport, PostRequest, TransportError};
