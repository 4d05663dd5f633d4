//! Request failures and their classification.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::health::HealthSignal;

/// Errors surfaced by the request pipeline.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The circuit is open; no network attempt was made.
    #[error("Backend service is currently unavailable. Please try again later.")]
    ServiceUnavailable,

    /// The request exceeded its deadline and was aborted.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend responded with {status}")]
    Status { status: StatusCode, body: String },

    /// The request could not be built (bad path, unserializable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse failure taxonomy used for policy decisions and UI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    AdmissionDenied,
    Transport,
    Server,
    Auth,
    Other,
}

impl FailureClass {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureClass::AdmissionDenied => "admission_denied",
            FailureClass::Transport => "transport",
            FailureClass::Server => "server",
            FailureClass::Auth => "auth",
            FailureClass::Other => "other",
        }
    }
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn failure_class(&self) -> FailureClass {
        match self {
            RequestError::ServiceUnavailable => FailureClass::AdmissionDenied,
            RequestError::Timeout(_) | RequestError::Transport(_) => FailureClass::Transport,
            RequestError::Status { status, .. }
                if status.is_server_error() || *status == StatusCode::NOT_FOUND =>
            {
                FailureClass::Server
            }
            RequestError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                FailureClass::Auth
            }
            RequestError::Status { .. } | RequestError::InvalidRequest(_) => FailureClass::Other,
        }
    }

    /// Whether this failure says the backend is unavailable.
    pub fn is_health_signal(&self) -> bool {
        matches!(self.failure_class(), FailureClass::Transport | FailureClass::Server)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.failure_class() == FailureClass::Auth
    }

    pub fn health_signal(&self) -> HealthSignal {
        if self.is_health_signal() {
            HealthSignal::Unreachable
        } else {
            HealthSignal::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> RequestError {
        RequestError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(RequestError::ServiceUnavailable.failure_class(), FailureClass::AdmissionDenied);
        assert_eq!(
            RequestError::Timeout(Duration::from_secs(1)).failure_class(),
            FailureClass::Transport
        );
        assert_eq!(status(500).failure_class(), FailureClass::Server);
        assert_eq!(status(503).failure_class(), FailureClass::Server);
        assert_eq!(status(404).failure_class(), FailureClass::Server);
        assert_eq!(status(401).failure_class(), FailureClass::Auth);
        assert_eq!(status(403).failure_class(), FailureClass::Other);
        assert_eq!(status(422).failure_class(), FailureClass::Other);
        assert_eq!(RequestError::InvalidRequest("x".into()).failure_class(), FailureClass::Other);
    }

    #[test]
    fn test_health_signals() {
        assert!(status(502).is_health_signal());
        assert!(status(404).is_health_signal());
        assert!(!status(401).is_health_signal());
        assert!(!status(400).is_health_signal());
        assert!(!RequestError::ServiceUnavailable.is_health_signal());
        assert_eq!(status(401).health_signal(), HealthSignal::Neutral);
        assert_eq!(status(503).health_signal(), HealthSignal::Unreachable);
    }

    #[test]
    fn test_admission_denied_message() {
        assert_eq!(
            RequestError::ServiceUnavailable.to_string(),
            "Backend service is currently unavailable. Please try again later."
        );
        assert_eq!(status(401).status(), Some(StatusCode::UNAUTHORIZED));
        assert!(status(401).is_unauthorized());
    }
}
