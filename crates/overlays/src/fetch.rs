//! Transport seam between overlays and the network.
//!
//! Overlays never await inside their own state; the composition root runs
//! [`Fetcher::get`] and hands the result back to the overlay that issued the
//! request.

use std::future::Future;
use std::pin::Pin;

use formats::NormalizeError;
use thiserror::Error;
use url::Url;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("empty response body")]
    EmptyBody,
    #[error(transparent)]
    Malformed(#[from] NormalizeError),
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FetchError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Body of a usable response. Anything but 200 with content is "no data".
    pub fn into_body(self) -> Result<String, FetchError> {
        if self.status != 200 {
            return Err(FetchError::Status(self.status));
        }
        if self.body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(self.body)
    }
}

/// HTTP GET provider.
///
/// Implementations must be `Send + Sync`; methods return boxed futures for
/// dyn-compatibility.
pub trait Fetcher: Send + Sync {
    fn get(&self, url: &Url) -> BoxFuture<'_, Result<FetchResponse, FetchError>>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &Url) -> BoxFuture<'_, Result<FetchResponse, FetchError>> {
        let url = url.clone();
        Box::pin(async move {
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::with_source("HTTP request failed", e))?;
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .map_err(|e| FetchError::with_source("reading response body failed", e))?;
            Ok(FetchResponse { status, body })
        })
    }
}
