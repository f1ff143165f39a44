/*!
 * Error types for the wabulk application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the messaging backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while composing or sending a bulk message
#[derive(Error, Debug)]
pub enum SendError {
    /// No contacts were supplied
    #[error("No contacts to send to")]
    NoContacts,

    /// The message translated to blank text
    #[error("Message is empty")]
    EmptyMessage,

    /// Sending was attempted before the session was authenticated
    #[error("Session for '{0}' is not authenticated")]
    NotAuthenticated(String),

    /// Error from the backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}
