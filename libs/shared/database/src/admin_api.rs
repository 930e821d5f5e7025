use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Response wrapper used by every admin API endpoint. Absent fields read as `None`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Error, Debug)]
pub enum AdminApiError {
    #[error("Authentication error ({status}): {body}")]
    Unauthorized { status: StatusCode, body: String },

    #[error("API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid authorization token")]
    InvalidToken,
}

impl AdminApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AdminApiError::Unauthorized { status, .. } | AdminApiError::Status { status, .. } => {
                Some(*status)
            }
            AdminApiError::InvalidToken => None,
        }
    }
}

pub struct AdminApiClient {
    client: Client,
    base_url: String,
}

impl AdminApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.store_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.admin_api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_headers(&self, auth_token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let bearer = HeaderValue::from_str(&format!("Bearer {}", auth_token))
            .map_err(|_| AdminApiError::InvalidToken)?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        auth_token: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.get_headers(auth_token)?);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => AdminApiError::Unauthorized { status, body: error_text },
                _ => AdminApiError::Status { status, body: error_text },
            }
            .into());
        }

        Ok(response)
    }

    /// Sends a request and returns the decoded response envelope.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: &str,
        body: Option<Value>,
    ) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, auth_token, body).await?;
        let envelope = response.json::<ApiEnvelope<T>>().await?;
        Ok(envelope)
    }

    /// Sends a request and returns the envelope's `data`, failing if it is absent.
    pub async fn request_data<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: &str,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let envelope = self.request::<T>(method, path, auth_token, body).await?;
        envelope
            .data
            .ok_or_else(|| anyhow!("Response from {} carried no data", path))
    }

    /// Sends a request whose response body is irrelevant.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        auth_token: &str,
        body: Option<Value>,
    ) -> Result<StatusCode> {
        let response = self.send(method, path, auth_token, body).await?;
        Ok(response.status())
    }
}

/// Status carried by an admin API failure, if the failure came from a response.
pub fn error_status(err: &anyhow::Error) -> Option<StatusCode> {
    err.downcast_ref::<AdminApiError>().and_then(AdminApiError::status)
}
