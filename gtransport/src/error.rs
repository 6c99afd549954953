//! Transport error kinds and helper constructors.
//!
//! ```rust
//! use gtransport::TransportError;
//!
//! let auth = TransportError::authentication("bad key");
//! assert!(!auth.retryable);
//!
//! let timeout = TransportError::timeout("request timed out");
//! assert!(timeout.retryable);
//!
//! let deadline = TransportError::deadline_exceeded("call deadline of 30s elapsed");
//! assert!(!deadline.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidRequest, message, false)
    }

    /// A transport-level timeout on one attempt; eligible for retry.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message, true)
    }

    /// The whole-call deadline elapsed; retry is suppressed for this call.
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message, false)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unavailable, message, true)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message, false)
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for TransportError {}
