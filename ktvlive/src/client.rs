//! HTTP client for the channel API
//!
//! This module provides the raw, error-propagating client for the four
//! channel endpoints. Failures come back as [`Error`]; the soft-failure
//! contract used by UIs lives in [`crate::gateway`].
//!
//! # Example
//!
//! ```no_run
//! use ktvlive::{ChannelType, ChannelsClient, CommentSubmission};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ChannelsClient::builder()
//!         .base_url("http://192.168.1.10:7000/api")
//!         .build()
//!         .await?;
//!
//!     let directory = client.fetch_directory().await?;
//!     for channel in directory.bucket(ChannelType::Terrestrial) {
//!         println!("{} {}", channel.channel_number, channel.name);
//!     }
//!
//!     let gateway = client.locate_jikkyo_gateway("gr011").await?;
//!     if gateway.is_available() {
//!         let result = client
//!             .submit_comment("gr011", &CommentSubmission::new("こんばんは", 1200))
//!             .await?;
//!         println!("{}", result.detail);
//!     }
//!     Ok(())
//! }
//! ```

use crate::channel_id::ChannelRef;
use crate::error::{Error, Result};
use crate::models::{
    ChannelDirectory, CommentResult, CommentSubmission, JikkyoGatewayInfo, LiveChannel,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default API base URL (local server)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7000/api";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "ktvlive/0.1.0";

/// Channel API HTTP client
///
/// The client is stateless: every call is one self-contained request and
/// nothing is cached between calls. Cloning is cheap and clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct ChannelsClient {
    pub(crate) client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ChannelsClient {
    /// Create a new client with default settings
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Fetch the full directory, grouped by channel type
    ///
    /// The directory is validated before it is returned: a channel listed
    /// under the wrong type, a non-canonical id or a duplicate id is
    /// reported as [`Error::Contract`].
    pub async fn fetch_directory(&self) -> Result<ChannelDirectory> {
        let url = self.endpoint(&["channels"])?;
        let directory: ChannelDirectory = self.send_json(self.client.get(url)).await?;
        directory.validate()?;

        tracing::debug!(
            channels = directory.len(),
            terrestrial = directory.terrestrial.len(),
            bs = directory.bs.len(),
            cs = directory.cs.len(),
            "Received channel directory"
        );

        Ok(directory)
    }

    /// Fetch one channel by canonical id or display id
    ///
    /// A channel whose `id` is not the canonical rendering of its
    /// network/service pair is reported as [`Error::Contract`].
    pub async fn fetch_channel(&self, channel: impl Into<ChannelRef>) -> Result<LiveChannel> {
        let channel = channel.into();
        let segment = channel.as_path_segment();
        let url = self.endpoint(&["channels", segment.as_str()])?;
        let live: LiveChannel = self.send_json(self.client.get(url)).await?;
        if !live.has_canonical_id() {
            return Err(Error::contract(format!(
                "channel id {} does not match {}",
                live.id,
                live.canonical_id()
            )));
        }

        tracing::debug!(channel = %live.id, name = %live.name, "Received channel");
        Ok(live)
    }

    /// Resolve the Jikkyo WebSocket endpoint for a channel
    ///
    /// `websocket_url == None` is a successful answer meaning no commentary
    /// is available right now.
    pub async fn locate_jikkyo_gateway(
        &self,
        channel: impl Into<ChannelRef>,
    ) -> Result<JikkyoGatewayInfo> {
        let channel = channel.into();
        let segment = channel.as_path_segment();
        let url = self.endpoint(&["channels", segment.as_str(), "jikkyo"])?;
        let info: JikkyoGatewayInfo = self.send_json(self.client.get(url)).await?;

        tracing::debug!(
            channel = %channel,
            available = info.is_available(),
            exclusive = info.is_nxjikkyo_exclusive,
            "Resolved Jikkyo gateway"
        );
        Ok(info)
    }

    /// Post a comment to a channel's Jikkyo thread
    ///
    /// A rejection by the server (`is_success == false`) is returned as
    /// `Ok`. The request is sent at most once.
    pub async fn submit_comment(
        &self,
        channel: impl Into<ChannelRef>,
        comment: &CommentSubmission,
    ) -> Result<CommentResult> {
        let channel = channel.into();
        let segment = channel.as_path_segment();
        let url = self.endpoint(&["channels", segment.as_str(), "jikkyo", "comment"])?;
        let result: CommentResult = self.send_json(self.client.post(url).json(comment)).await?;

        tracing::debug!(
            channel = %channel,
            vpos = comment.vpos,
            success = result.is_success,
            detail = %result.detail,
            "Comment submitted"
        );
        Ok(result)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::other(format!("Base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = request.timeout(self.timeout).build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: serde_json::Value,
}

/// Extract a readable detail from an error body
///
/// `detail` is either a plain string or, for request validation errors, a
/// list of objects whose first `msg` is used.
fn error_detail(body: &[u8]) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    match envelope.detail {
        serde_json::Value::String(detail) => Some(detail),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Builder for configuring a ChannelsClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    ///
    /// User-Agent and proxy settings are ignored when a client is supplied.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL (e.g., "http://127.0.0.1:7000/api")
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<ChannelsClient> {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::other(format!(
                "Base URL cannot take a path: {}",
                self.base_url
            )));
        }

        let client = if let Some(client) = self.client {
            client
        } else {
            let mut builder = Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout);

            if let Some(proxy_url) = &self.proxy {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::other(format!("Invalid proxy: {}", e)))?;
                builder = builder.proxy(proxy);
            }

            builder.build()?
        };

        Ok(ChannelsClient {
            client,
            base_url,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn client_at(base: &str) -> ChannelsClient {
        ChannelsClient::builder().base_url(base).build().await.unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::default();
        assert_eq!(builder.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            builder.timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert_eq!(builder.user_agent, DEFAULT_USER_AGENT);
    }

    #[tokio::test]
    async fn test_endpoint_joins_segments() {
        let client = client_at("http://tv.local:7000/api").await;
        assert_eq!(
            client.endpoint(&["channels", "gr011", "jikkyo"]).unwrap().as_str(),
            "http://tv.local:7000/api/channels/gr011/jikkyo"
        );

        // Trailing slash on the base is not doubled
        let client = client_at("http://tv.local:7000/api/").await;
        assert_eq!(
            client.endpoint(&["channels"]).unwrap().as_str(),
            "http://tv.local:7000/api/channels"
        );
    }

    #[tokio::test]
    async fn test_endpoint_encodes_channel_segment() {
        let client = client_at("http://tv.local:7000/api").await;
        let url = client.endpoint(&["channels", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://tv.local:7000/api/channels/a%2Fb%20c");
    }

    #[tokio::test]
    async fn test_build_rejects_bad_base_url() {
        let err = ChannelsClient::builder()
            .base_url("not a url")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));

        let err = ChannelsClient::builder()
            .base_url("mailto:tv@example.com")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_error_detail_forms() {
        assert_eq!(
            error_detail(br#"{"detail": "Specified channel_id was not found"}"#).as_deref(),
            Some("Specified channel_id was not found")
        );
        assert_eq!(
            error_detail(br#"{"detail": [{"loc": ["body", "vpos"], "msg": "field required"}]}"#)
                .as_deref(),
            Some("field required")
        );
        assert_eq!(error_detail(b"<html>Bad Gateway</html>"), None);
        assert_eq!(error_detail(br#"{"detail": 42}"#), None);
    }
}
