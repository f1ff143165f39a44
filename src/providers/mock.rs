/*!
 * Mock backend implementation for testing.
 *
 * `ScriptedBackend` replays a script of status replies, one per query:
 * - `ScriptedReply::Status` answers immediately
 * - `ScriptedReply::Failure` simulates a transport failure
 * - `ScriptedReply::Held` waits until the test releases it
 *
 * Once the script is exhausted every query answers "not authenticated".
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::errors::BackendError;
use crate::session::StatusResponse;

use super::{Contact, MessagingBackend, SendReport, SendRequest, SessionService};

/// One scripted answer to a status query
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Answer with this status
    Status(StatusResponse),
    /// Fail with this error
    Failure(BackendError),
    /// Answer with the inner reply once `release` is notified
    Held {
        reply: Box<ScriptedReply>,
        release: Arc<Notify>,
    },
}

impl ScriptedReply {
    /// Hold `reply` until the returned gate is notified
    pub fn held(reply: ScriptedReply) -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        let held = Self::Held {
            reply: Box::new(reply),
            release: Arc::clone(&release),
        };
        (held, release)
    }
}

/// Scripted in-memory backend
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    /// Remaining status replies
    script: Mutex<VecDeque<ScriptedReply>>,
    /// Error returned by `register`, if any
    register_failure: Option<BackendError>,
    /// Contacts returned by `upload_contacts`
    contacts: Vec<Contact>,
    /// Requests received by `send_messages`
    sent: Mutex<Vec<SendRequest>>,
    register_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Create a backend replaying `replies` in order
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Create a backend replaying plain status responses
    pub fn from_statuses(statuses: impl IntoIterator<Item = StatusResponse>) -> Self {
        Self::new(statuses.into_iter().map(ScriptedReply::Status))
    }

    /// A backend whose session is authenticated on the first query
    pub fn authenticated() -> Self {
        Self::from_statuses([StatusResponse::Authenticated])
    }

    /// Make `register` fail with `error`
    pub fn with_register_failure(mut self, error: BackendError) -> Self {
        self.register_failure = Some(error);
        self
    }

    /// Contacts returned by `upload_contacts`
    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Requests received by `send_messages`, oldest first
    pub fn sent_requests(&self) -> Vec<SendRequest> {
        self.sent.lock().clone()
    }

    async fn resolve(reply: ScriptedReply) -> Result<StatusResponse, BackendError> {
        let mut reply = reply;
        loop {
            match reply {
                ScriptedReply::Status(status) => return Ok(status),
                ScriptedReply::Failure(error) => return Err(error),
                ScriptedReply::Held { reply: inner, release } => {
                    release.notified().await;
                    reply = *inner;
                }
            }
        }
    }
}

#[async_trait]
impl SessionService for ScriptedBackend {
    async fn register(&self, _identity: &str) -> Result<(), BackendError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        match &self.register_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn query_status(&self, _identity: &str) -> Result<StatusResponse, BackendError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        match next {
            Some(reply) => Self::resolve(reply).await,
            None => Ok(StatusResponse::pending()),
        }
    }
}

#[async_trait]
impl MessagingBackend for ScriptedBackend {
    async fn upload_contacts(
        &self,
        _identity: &str,
        _file_name: &str,
        _content: Vec<u8>,
    ) -> Result<Vec<Contact>, BackendError> {
        Ok(self.contacts.clone())
    }

    async fn send_messages(&self, _identity: &str, request: &SendRequest) -> Result<SendReport, BackendError> {
        self.sent.lock().push(request.clone());
        Ok(SendReport {
            count: request.contacts.len(),
        })
    }
}
