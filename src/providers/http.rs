use async_trait::async_trait;
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

use crate::app_config::BackendConfig;
use crate::errors::BackendError;
use crate::session::StatusResponse;

use super::{Contact, MessagingBackend, RegisterRequest, SendReport, SendRequest, SessionService, UploadResponse};

/// HTTP client for the messaging backend REST API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// Base URL of the backend
    base_url: Url,
    /// HTTP client for making requests
    client: Client,
}

impl HttpBackend {
    /// Create a new client for the backend at `endpoint`
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(endpoint)
            .map_err(|e| BackendError::RequestFailed(format!("Invalid backend endpoint '{}': {}", endpoint, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(BackendError::RequestFailed(format!(
                "Backend endpoint '{}' cannot be used as a base URL",
                endpoint
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            // Keep connections alive across polling ticks
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| BackendError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Create a client from the backend configuration section
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(&config.endpoint, Duration::from_secs(config.timeout_secs))
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    pub fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Turn non-2xx responses into `BackendError::ApiError`
    async fn check_status(response: Response, operation: &str) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("Backend {} error ({}): {}", operation, status, error_text);

        Err(BackendError::ApiError {
            status_code: status.as_u16(),
            message: error_text,
        })
    }
}

#[async_trait]
impl SessionService for HttpBackend {
    async fn register(&self, identity: &str) -> Result<(), BackendError> {
        let url = self.endpoint_url(&["init-session"]);
        debug!("Registering session {} at {}", identity, url);

        let response = self
            .client
            .post(url)
            .json(&RegisterRequest {
                user_id: identity.to_string(),
            })
            .send()
            .await?;

        Self::check_status(response, "init-session").await?;
        Ok(())
    }

    async fn query_status(&self, identity: &str) -> Result<StatusResponse, BackendError> {
        let url = self.endpoint_url(&["qr", identity]);

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, "status").await?;

        let body = response.text().await?;
        serde_json::from_str::<StatusResponse>(&body).map_err(|e| {
            BackendError::ParseError(format!(
                "{}. Raw response (first 200 chars): {}",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[async_trait]
impl MessagingBackend for HttpBackend {
    async fn upload_contacts(
        &self,
        identity: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<Vec<Contact>, BackendError> {
        let url = self.endpoint_url(&["upload", identity]);

        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self.client.post(url).multipart(form).send().await?;
        let response = Self::check_status(response, "upload").await?;

        let upload: UploadResponse = response.json().await?;
        Ok(upload.contacts)
    }

    async fn send_messages(&self, identity: &str, request: &SendRequest) -> Result<SendReport, BackendError> {
        let url = self.endpoint_url(&["send", identity]);

        let response = self.client.post(url).json(request).send().await?;
        let response = Self::check_status(response, "send").await?;

        Ok(response.json::<SendReport>().await?)
    }
}
