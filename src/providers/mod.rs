/*!
 * Client implementations for the messaging backend.
 *
 * The backend owns the actual messaging session. This module defines the
 * contracts the rest of the crate depends on:
 * - `SessionService`: session registration and status polling
 * - `MessagingBackend`: contact upload and bulk send
 *
 * and provides two implementations:
 * - `http`: reqwest-based client for the REST backend
 * - `mock`: scripted in-memory backend for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::BackendError;
use crate::session::StatusResponse;

pub mod http;
pub mod mock;

/// A contact as returned by the backend's CSV import; opaque to this crate
pub type Contact = serde_json::Value;

/// Session registration and status queries
#[async_trait]
pub trait SessionService: Send + Sync + Debug {
    /// Ask the backend to create (or resume) the session for `identity`
    async fn register(&self, identity: &str) -> Result<(), BackendError>;

    /// Query the current authentication status of `identity`
    async fn query_status(&self, identity: &str) -> Result<StatusResponse, BackendError>;
}

/// Contact import and message delivery
#[async_trait]
pub trait MessagingBackend: SessionService {
    /// Upload a contact file; the backend parses it and returns the contacts
    async fn upload_contacts(
        &self,
        identity: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<Vec<Contact>, BackendError>;

    /// Send one message to every contact
    async fn send_messages(&self, identity: &str, request: &SendRequest) -> Result<SendReport, BackendError>;
}

/// Body of the session registration call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response of the contact upload call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// Body of the send call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Recipients
    pub contacts: Vec<Contact>,
    /// Message already converted to platform markup
    pub message: String,
}

/// Response of the send call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    /// Number of successful deliveries
    pub count: usize,
}
