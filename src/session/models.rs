/*!
 * Session-specific models.
 *
 * These structures describe the authentication lifecycle of a messaging
 * session and the notifications the monitor hands to its callers.
 */

use serde::{Deserialize, Serialize};

/// Authentication state of one session identity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Registered, no QR code received yet
    #[default]
    Initializing,
    /// Waiting for the user to scan the QR code
    AwaitingScan {
        /// Image-encoded QR payload (data URL)
        qr: String,
    },
    /// Authenticated; terminal
    Authenticated,
}

impl SessionState {
    /// QR payload, present only while awaiting a scan
    pub fn qr_payload(&self) -> Option<&str> {
        match self {
            Self::AwaitingScan { qr } => Some(qr),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Apply a status report. Returns true when the state changed.
    pub fn on_status(&mut self, status: StatusResponse) -> bool {
        if self.is_authenticated() {
            return false;
        }

        match status {
            StatusResponse::Authenticated => {
                *self = Self::Authenticated;
                true
            }
            StatusResponse::NotAuthenticated { qr: Some(qr) } if !qr.is_empty() => {
                if self.qr_payload() == Some(qr.as_str()) {
                    return false;
                }
                *self = Self::AwaitingScan { qr };
                true
            }
            StatusResponse::NotAuthenticated { .. } => false,
        }
    }

    /// Get a human-readable status string
    pub fn status_display(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::AwaitingScan { .. } => "Awaiting QR scan",
            Self::Authenticated => "Connected",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status_display())
    }
}

/// Status report returned by the backend for one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusResponse {
    Authenticated,
    NotAuthenticated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qr: Option<String>,
    },
}

impl StatusResponse {
    /// Not authenticated, no QR code yet
    pub fn pending() -> Self {
        Self::NotAuthenticated { qr: None }
    }

    /// Not authenticated, with a QR code to scan
    pub fn with_qr(qr: impl Into<String>) -> Self {
        Self::NotAuthenticated { qr: Some(qr.into()) }
    }
}

/// Advisory notification emitted by the session monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// The registration call failed; polling continues regardless
    RegistrationFailed { identity: String, error: String },
    /// A new QR code is available
    QrUpdated { identity: String, qr: String },
    /// A status query failed; the next tick retries
    PollFailed { identity: String, error: String },
    /// The session is authenticated and polling has stopped
    Authenticated { identity: String },
}

impl MonitorEvent {
    pub fn identity(&self) -> &str {
        match self {
            Self::RegistrationFailed { identity, .. }
            | Self::QrUpdated { identity, .. }
            | Self::PollFailed { identity, .. }
            | Self::Authenticated { identity } => identity,
        }
    }
}
