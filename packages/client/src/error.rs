//! Error taxonomy for client operations.
//!
//! Every failure is an [`ApiError`]: the operation that failed plus one of
//! five [`ErrorKind`]s. The display form is `"<Operation> - <message>"`, so a
//! log line or UI message always names the call that produced it.
//!
//! | Kind | Meaning |
//! |------|---------|
//! | `Serialization` | The request body could not be built; nothing was sent |
//! | `Transport` | Sent, but no successful response |
//! | `Deserialization` | Response body is not JSON or has the wrong shape |
//! | `Application` | The backend reported an error message (carried verbatim) |
//! | `Validation` | Nominally successful response missing a required field |

use std::fmt;

use ows_core::Endpoint;

use crate::transport::TransportError;

/// What was being attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A backend call.
    Api(Endpoint),
    /// Local travel URL construction.
    BuildTravelUrl,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Api(endpoint) => f.write_str(endpoint.name()),
            Operation::BuildTravelUrl => f.write_str("BuildTravelUrl"),
        }
    }
}

impl From<Endpoint> for Operation {
    fn from(endpoint: Endpoint) -> Self {
        Operation::Api(endpoint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("error serializing request: {0}")]
    Serialization(String),

    #[error("error accessing server: {0}")]
    Transport(#[from] TransportError),

    #[error("error deserializing response: {0}")]
    Deserialization(String),

    #[error("{0}")]
    Application(String),

    #[error("{0}")]
    Validation(String),
}

/// A failed client operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} - {kind}")]
pub struct ApiError {
    pub operation: Operation,
    pub kind: ErrorKind,
}

impl ApiError {
    pub fn new(operation: impl Into<Operation>, kind: ErrorKind) -> Self {
        Self {
            operation: operation.into(),
            kind,
        }
    }

    pub fn serialization(operation: impl Into<Operation>, err: impl fmt::Display) -> Self {
        Self::new(operation, ErrorKind::Serialization(err.to_string()))
    }

    pub fn deserialization(operation: impl Into<Operation>, err: impl fmt::Display) -> Self {
        Self::new(operation, ErrorKind::Deserialization(err.to_string()))
    }

    pub fn application(operation: impl Into<Operation>, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::Application(message.into()))
    }

    pub fn validation(operation: impl Into<Operation>, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::Validation(message.into()))
    }

    /// The message without the operation prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
