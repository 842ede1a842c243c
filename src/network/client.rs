//! HTTP client for archive requests and file downloads

use super::user_agent::{accept_json, default_user_agent};
use crate::config::OutgoingSettings;
use crate::error::ArchiveError;
use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP response with the body fully read
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response URL (after redirects)
    pub url: String,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ArchiveError> {
        serde_json::from_slice(&self.body).map_err(|e| ArchiveError::Malformed(e.to_string()))
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with [`ArchiveError::Http`] unless the status is 2xx
    pub fn error_for_status(self) -> Result<Self, ArchiveError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ArchiveError::Http {
                status: self.status,
            })
        }
    }
}

/// HTTP client wrapper with Llomax-specific configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ArchiveError> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self, ArchiveError> {
        let default_timeout = Duration::try_from_secs_f64(settings.request_timeout.max(0.1))
            .map_err(|e| ArchiveError::Network(format!("invalid request timeout: {}", e)))?;
        let client = Client::builder()
            .timeout(default_timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ArchiveError::Network(e.to_string()))?;

        Ok(Self {
            client,
            default_timeout,
            user_agent: settings
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
        })
    }

    /// Simple GET request
    pub async fn get(&self, url: &str) -> Result<HttpResponse, ArchiveError> {
        self.get_with_params(url, &[]).await
    }

    /// GET request with query parameters; keys may repeat
    pub async fn get_with_params(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<HttpResponse, ArchiveError> {
        let mut req_builder = self
            .client
            .get(url)
            .timeout(self.default_timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", accept_json());

        if !params.is_empty() {
            req_builder = req_builder.query(params);
        }

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// GET a file body; the status is left for the caller to check
    pub async fn download(&self, url: &str) -> Result<HttpResponse, ArchiveError> {
        let response = self
            .client
            .get(url)
            .timeout(self.default_timeout)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Parse response into HttpResponse
    async fn parse_response(response: Response) -> Result<HttpResponse, ArchiveError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, url, body })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
