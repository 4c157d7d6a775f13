use async_trait::async_trait;
use log::info;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::error::TileFetchError;
use crate::platform::{HttpResponse, PlatformService};
use crate::proxy::ProxySettings;

/// User agent sent with every tile request.
pub const USER_AGENT: &str = concat!(
    "tilefetch/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/tilefetch/tilefetch)"
);

/// [`PlatformService`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct NativePlatformService {
    http_client: reqwest::Client,
}

impl NativePlatformService {
    /// Creates a new service. Without `proxy` the client uses the system proxy configuration.
    pub fn new(proxy: Option<&ProxySettings>) -> Result<Self, TileFetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none());

        if let Some(proxy) = proxy {
            info!("Sending tile requests through proxy {}", proxy.url());
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        Ok(Self {
            http_client: builder.build()?,
        })
    }
}

#[async_trait]
impl PlatformService for NativePlatformService {
    async fn fetch(&self, url: &Url) -> Result<HttpResponse, TileFetchError> {
        info!("Loading {url}");
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();

        let redirect = if status.is_redirection() {
            response
                .headers()
                .get(LOCATION)
                .and_then(|location| location.to_str().ok())
                .and_then(|location| url.join(location).ok())
        } else {
            None
        };

        let body = response.bytes().await?;

        Ok(HttpResponse {
            url: url.clone(),
            status,
            redirect,
            body,
        })
    }
}
