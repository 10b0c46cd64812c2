//! Error taxonomy for every call that crosses the client boundary.

use std::time::Duration;

/// Failure of a gateway call or of a check performed before one.
///
/// Every variant is terminal for the attempt that produced it; nothing in
/// this crate retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request did not complete within the configured bound.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The backend answered 401; the stored credential has been cleared.
    #[error("authentication rejected by the backend")]
    Unauthorized,

    /// The backend answered with a non-success status other than 401.
    #[error("backend rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Connection, DNS or protocol failure before a status was received.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("invalid response payload: {0}")]
    Decode(String),

    /// A required field was missing; no request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Another mutation on the same record is still waiting for the backend.
    #[error("a change to {0} is already in progress")]
    Busy(String),

    /// The request could not be built (bad base URL, unencodable path).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// True for the 401-equivalent outcome.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// True when the request was never sent because of a local check.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_) | ApiError::Busy(_) | ApiError::InvalidRequest(_)
        )
    }

    /// HTTP status carried by the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
