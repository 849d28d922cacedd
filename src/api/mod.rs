//! Client for the public CoWIN API.
//!
//! The directory endpoints resolve state and district names to ids; the
//! calendar endpoints return the centers and sessions for a location and
//! date. Every call is a single request with a fixed timeout and no retries.

pub mod availability;
pub mod directory;

use crate::config::ApiConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to build the HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response from {url} (status {status}) is not the expected JSON shape")]
    Decode {
        url: String,
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
    #[error("response from {url} is missing the `{key}` key")]
    UnexpectedShape { url: String, key: &'static str },
}

/// A thin wrapper over `reqwest` bound to one API base URL.
#[derive(Debug, Clone)]
pub struct CowinClient {
    http: Client,
    base_url: String,
}

impl CowinClient {
    /// Creates a client from the API section of the configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issues a GET and decodes the body into `T`.
    ///
    /// The status code is not checked: an error page simply fails to decode,
    /// and the resulting error carries the status for diagnosis.
    #[instrument(skip(self, query))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        debug!(status = %status, bytes = body.len(), "Received API response");

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url,
            status,
            source,
        })
    }
}
