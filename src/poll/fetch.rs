// src/poll/fetch.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// Raw response of one attempt. Replaced on every attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub address: String,
    pub status: u16,
    /// `Content-Length` as announced by the server, if any.
    pub content_length: Option<u64>,
    pub body: Vec<u8>,
}

impl FetchResult {
    pub fn new(address: impl Into<String>, status: u16, body: Vec<u8>) -> Self {
        Self {
            address: address.into(),
            status,
            content_length: None,
            body,
        }
    }

    pub fn with_content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    /// Announced length, falling back to the received body size.
    pub fn effective_length(&self) -> u64 {
        self.content_length.unwrap_or(self.body.len() as u64)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error fetching {address}: {message}")]
    Transport { address: String, message: String },
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<FetchResult, FetchError>;
}

/// Plain unauthenticated GET. Non-2xx statuses are results, not errors.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> Result<FetchResult, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            address: address.to_string(),
            message: e.to_string(),
        };

        let mut req = self.client.get(address);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }
        let resp = req.send().await.map_err(transport)?;
        let status = resp.status().as_u16();
        let content_length = resp.content_length();
        let body = resp.bytes().await.map_err(transport)?.to_vec();

        tracing::debug!(target: "fetch", %address, status, ?content_length, bytes = body.len(), "fetched");
        Ok(FetchResult {
            address: address.to_string(),
            status,
            content_length,
            body,
        })
    }
}
