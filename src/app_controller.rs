use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use crate::app_config::Config;
use crate::errors::SendError;
use crate::identity::IdentityStore;
use crate::markup::{translate, RichTextNode};
use crate::providers::http::HttpBackend;
use crate::providers::{Contact, MessagingBackend, SendReport, SendRequest};
use crate::session::{MonitorEvent, SessionHandle, SessionMonitor, SessionState};

// @module: Application controller for bulk sending

/// Main application controller composing session monitoring, markup and delivery
#[derive(Debug)]
pub struct Controller<B: MessagingBackend + 'static> {
    // @field: App configuration
    config: Config,
    // @field: Messaging backend
    backend: Arc<B>,
    // @field: Session monitor polling the backend
    monitor: SessionMonitor<B>,
    // @field: Identity the backend session is keyed by
    identity: String,
}

impl Controller<HttpBackend> {
    // @method: Create a controller talking to the configured HTTP backend
    pub fn with_config(config: Config) -> Result<Self> {
        let backend = HttpBackend::from_config(&config.backend)
            .context("Failed to create backend client")?;
        let identity = IdentityStore::from_config(&config.session)?.load_or_create()?;

        Ok(Self::new(config, Arc::new(backend), identity))
    }
}

impl<B: MessagingBackend + 'static> Controller<B> {
    /// Create a controller for `identity` using `backend`
    pub fn new(config: Config, backend: Arc<B>, identity: impl Into<String>) -> Self {
        let monitor = SessionMonitor::with_poll_interval(Arc::clone(&backend), config.session.poll_interval());
        Self {
            config,
            backend,
            monitor,
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current authentication state of this controller's session
    pub fn session_state(&self) -> SessionState {
        self.monitor
            .handle(&self.identity)
            .map(|handle| handle.state())
            .unwrap_or_default()
    }

    /// Start the session and wait until the backend reports it authenticated.
    ///
    /// Every new QR code is written to the configured image path while waiting.
    pub async fn authenticate(&self) -> Result<SessionHandle> {
        let mut events = self.monitor.events();
        let handle = self.monitor.start(&self.identity).await;

        if handle.state().is_authenticated() {
            info!("WhatsApp session {} already connected", self.identity);
            return Ok(handle);
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message("Initializing WhatsApp...");

        {
            let authenticated = handle.wait_until_authenticated();
            tokio::pin!(authenticated);

            loop {
                tokio::select! {
                    _ = &mut authenticated => break,
                    event = events.recv() => match event {
                        Ok(event) if event.identity() == self.identity => self.on_event(&event, &spinner),
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => debug!("Skipped {} session events", skipped),
                        Err(RecvError::Closed) => {
                            (&mut authenticated).await;
                            break;
                        }
                    },
                }
            }
        }

        spinner.finish_with_message("WhatsApp connected");
        info!("WhatsApp connected successfully!");
        Ok(handle)
    }

    fn on_event(&self, event: &MonitorEvent, spinner: &ProgressBar) {
        match event {
            MonitorEvent::QrUpdated { qr, .. } => match self.save_qr_image(qr) {
                Ok(path) => spinner.set_message(format!("Scan the QR code in {} with WhatsApp", path.display())),
                Err(e) => warn!("Failed to save QR code: {}", e),
            },
            MonitorEvent::RegistrationFailed { error, .. } => {
                spinner.set_message(format!("Failed to initialize session ({}), still polling", error));
            }
            MonitorEvent::PollFailed { error, .. } => {
                spinner.set_message(format!("Waiting for backend: {}", error));
            }
            MonitorEvent::Authenticated { .. } => spinner.set_message("Connected"),
        }
    }

    /// Decode a QR data URL and write the image to the configured path
    pub fn save_qr_image(&self, qr: &str) -> Result<PathBuf> {
        let image = Self::decode_qr_image(qr)?;
        let path = self.config.output.qr_image_path.clone();

        std::fs::write(&path, image)
            .with_context(|| format!("Failed to write QR image: {}", path.display()))?;
        debug!("QR code written to {}", path.display());

        Ok(path)
    }

    /// Extract the image bytes from a `data:<mime>;base64,<data>` URL
    pub fn decode_qr_image(qr: &str) -> Result<Vec<u8>> {
        let (header, data) = qr
            .split_once(',')
            .ok_or_else(|| anyhow!("QR payload is not a data URL"))?;

        if !header.starts_with("data:") || !header.ends_with(";base64") {
            return Err(anyhow!("Unsupported QR payload header: {}", header));
        }

        STANDARD.decode(data.trim()).context("QR payload is not valid base64")
    }

    /// Upload a contact file to the backend and return the parsed contacts
    pub async fn upload_contacts(&self, path: &Path) -> Result<Vec<Contact>> {
        self.ensure_authenticated()?;

        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read contacts file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "contacts.csv".to_string());

        let contacts = self
            .backend
            .upload_contacts(&self.identity, &file_name, content)
            .await
            .context("Failed to upload contacts")?;

        info!("Uploaded {} contacts", contacts.len());
        Ok(contacts)
    }

    /// Translate `message` and send it to every contact
    pub async fn send(&self, contacts: Vec<Contact>, message: &RichTextNode) -> Result<SendReport, SendError> {
        self.ensure_authenticated()?;

        if contacts.is_empty() {
            return Err(SendError::NoContacts);
        }

        let text = translate(message);
        if text.trim().is_empty() {
            return Err(SendError::EmptyMessage);
        }

        debug!("Sending message to {} contacts:\n{}", contacts.len(), text);
        let request = SendRequest { contacts, message: text };
        let report = self.backend.send_messages(&self.identity, &request).await?;

        info!("Messages sent to {} contacts!", report.count);
        Ok(report)
    }

    fn ensure_authenticated(&self) -> Result<(), SendError> {
        if self.session_state().is_authenticated() {
            Ok(())
        } else {
            Err(SendError::NotAuthenticated(self.identity.clone()))
        }
    }
}
