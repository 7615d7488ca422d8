//! HTTP client for the memorization REST API.
//!
//! The client is an immutable value: base URL, timeout and credential are fixed at
//! construction. Attaching a token produces a new client, so two sessions sharing
//! a process never see each other's credentials.

use crate::config::ApiConfig;
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} on {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client without credential
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Normalize URL - ensure no trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(format!(
                "'{}' must start with http:// or https://",
                base_url
            )));
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let client =
            Self::with_timeout(&config.base_url, Duration::from_secs(config.timeout_secs))?;
        Ok(match &config.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    /// Copy of this client that authenticates with `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.url(endpoint);
        log::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().inspect_err(|e| {
            log::error!("{} {} failed: {}", method, endpoint, e);
        })?;

        let status = response.status();
        if !status.is_success() {
            log::error!("{} {} returned {}", method, endpoint, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        Ok(response)
    }

    pub fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        Ok(self.execute(Method::GET, endpoint, None::<&()>)?.json()?)
    }

    pub fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Ok(self.execute(Method::POST, endpoint, Some(body))?.json()?)
    }

    /// POST whose response body is not needed.
    pub fn post_unit<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<(), ApiError> {
        self.execute(Method::POST, endpoint, Some(body))?;
        Ok(())
    }

    pub fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Ok(self.execute(Method::PUT, endpoint, Some(body))?.json()?)
    }

    pub fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Ok(self.execute(Method::PATCH, endpoint, Some(body))?.json()?)
    }

    pub fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, endpoint, None::<&()>)?;
        Ok(())
    }
}
