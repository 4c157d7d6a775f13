//! Provides the network transport used to download tiles and [`PlatformService`] to access it.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url};

use crate::error::TileFetchError;

mod native;
pub use native::{NativePlatformService, USER_AGENT};

/// Response to a single GET request. Redirects are not followed by the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Url the request was sent to.
    pub url: Url,
    /// Response status code.
    pub status: StatusCode,
    /// Target of the redirect, if the response is a redirect with a valid `Location` header.
    /// Relative locations are resolved against [`HttpResponse::url`].
    pub redirect: Option<Url>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Successful response with the given body.
    pub fn ok(url: Url, body: impl Into<Bytes>) -> Self {
        Self {
            url,
            status: StatusCode::OK,
            redirect: None,
            body: body.into(),
        }
    }

    /// `302 Found` response pointing to `target`.
    pub fn redirect(url: Url, target: Url) -> Self {
        Self {
            url,
            status: StatusCode::FOUND,
            redirect: Some(target),
            body: Bytes::new(),
        }
    }

    /// Response with an empty body and the given status.
    pub fn with_status(url: Url, status: StatusCode) -> Self {
        Self {
            url,
            status,
            redirect: None,
            body: Bytes::new(),
        }
    }

    /// Returns true if the status is `2xx`.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Service sending tile requests over the network.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Sends a GET request to the given url and returns the response without following
    /// redirects.
    ///
    /// Returns an error only if no response was received.
    async fn fetch(&self, url: &Url) -> Result<HttpResponse, TileFetchError>;
}
