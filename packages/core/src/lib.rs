//! Pure logic for the OWS2 session client.
//!
//! This crate holds everything that does not touch the network: the travel
//! token codec, the travel payload and URL format, and the catalogue of
//! backend endpoints. It is the foundation for the `ows-client` session
//! client and the `ows` CLI.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`codec`] | AES travel token [`encrypt`] / [`decrypt`] |
//! | [`travel`] | [`TravelPayload`], [`ZoneServerLocation`], [`build_travel_url`] |
//! | [`endpoint`] | [`Endpoint`], [`ApiModule`] and base-path resolution via [`ApiPaths`] |
//!
//! # Quick start
//!
//! ```rust
//! use ows_core::{build_travel_url, Coordinates, TravelPayload, ZoneServerLocation};
//!
//! let payload = TravelPayload::new(Coordinates::default(), "Hero", "abc-123");
//! let location = ZoneServerLocation::new("10.0.0.5", "7777");
//! let url = build_travel_url(&location, &payload, "mykey").unwrap();
//! assert!(url.starts_with("10.0.0.5:7777?ID="));
//! ```

pub mod codec;
pub mod endpoint;
pub mod travel;

pub use codec::{decrypt, encrypt, try_decrypt, try_encrypt, CodecError};
pub use endpoint::{ApiModule, ApiPaths, Endpoint};
pub use travel::{
    build_travel_url, render_float, token_from_url, Coordinates, TravelError, TravelPayload,
    ZoneServerLocation, LAST_ZONE, TOKEN_PARAM,
};
