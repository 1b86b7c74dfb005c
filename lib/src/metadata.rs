//! Metadata store: resolves token URIs to product metadata documents.

use crate::config::MetadataConfig;
use crate::error::{EthcaliError, Result};
use crate::http::HttpClient;
use crate::product::ProductMetadata;
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;

const DATA_JSON_BASE64: &str = "data:application/json;base64,";

/// Where a metadata URI's document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataLocation {
    /// Fetch from this HTTP(S) URL
    Http(String),
    /// Document is embedded in the URI
    Inline(Vec<u8>),
}

/// Map a token URI to a fetchable location.
///
/// Handles `ipfs://` (with or without an `ipfs/` segment), bare CIDs,
/// `http(s)://` passthrough, and inline base64 JSON.
pub fn locate(uri: &str, gateway: &str) -> Result<MetadataLocation> {
    let uri = uri.trim();
    let gateway = gateway.trim_end_matches('/');

    if let Some(encoded) = uri.strip_prefix(DATA_JSON_BASE64) {
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        return Ok(MetadataLocation::Inline(decoded));
    }
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Ok(MetadataLocation::Http(uri.to_string()));
    }
    if let Some(path) = uri.strip_prefix("ipfs://") {
        let path = path.strip_prefix("ipfs/").unwrap_or(path);
        if path.is_empty() {
            return Err(EthcaliError::metadata(format!("Empty IPFS URI: {uri}")));
        }
        return Ok(MetadataLocation::Http(format!("{gateway}/ipfs/{path}")));
    }
    if !uri.is_empty() && !uri.contains("://") && !uri.contains(char::is_whitespace) {
        return Ok(MetadataLocation::Http(format!("{gateway}/ipfs/{uri}")));
    }
    Err(EthcaliError::metadata(format!("Unsupported metadata URI: {uri}")))
}

/// Delay before retry number `attempt` (zero-based): `min(base * 2^attempt, cap)`
pub fn backoff_delay(attempt: u32, base: Duration, cap: Duration) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .unwrap_or(cap)
        .min(cap)
}

/// Read-only metadata lookup
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<ProductMetadata>;
}

/// Publishes a metadata document and returns its URI
#[async_trait]
pub trait MetadataPinner: Send + Sync {
    async fn pin(&self, metadata: &ProductMetadata) -> Result<String>;
}

/// Raw document transport, one attempt per call
#[async_trait]
pub trait MetadataTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;
}

/// curl-backed transport run on the blocking pool
pub struct CurlTransport;

#[async_trait]
impl MetadataTransport for CurlTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let mut client = HttpClient::builder()
                .timeout(timeout)
                .follow_redirects(true)
                .header("Accept", "application/json")
                .build()?;
            let response = client.get(&url)?;
            if !response.is_success() {
                return Err(EthcaliError::Http(format!(
                    "Gateway returned HTTP {} for {url}",
                    response.status_code
                )));
            }
            Ok(response.body)
        })
        .await
        .map_err(|e| EthcaliError::Http(e.to_string()))?
    }
}

/// Gateway-backed metadata store with a per-attempt deadline and
/// exponential backoff between attempts.
pub struct IpfsMetadataClient {
    config: MetadataConfig,
    transport: Arc<dyn MetadataTransport>,
}

impl IpfsMetadataClient {
    pub fn new(config: MetadataConfig) -> Self {
        Self::with_transport(config, Arc::new(CurlTransport))
    }

    pub fn with_transport(config: MetadataConfig, transport: Arc<dyn MetadataTransport>) -> Self {
        Self { config, transport }
    }

    async fn attempt(&self, url: &str) -> Result<ProductMetadata> {
        let timeout = self.config.timeout();
        let body = tokio::time::timeout(timeout, self.transport.get(url, timeout))
            .await
            .map_err(|_| {
                EthcaliError::metadata(format!("Timed out after {}s fetching {url}", timeout.as_secs()))
            })??;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl MetadataStore for IpfsMetadataClient {
    async fn fetch(&self, uri: &str) -> Result<ProductMetadata> {
        let url = match locate(uri, &self.config.gateway)? {
            MetadataLocation::Inline(bytes) => return Ok(serde_json::from_slice(&bytes)?),
            MetadataLocation::Http(url) => url,
        };

        let mut attempt = 0;
        loop {
            match self.attempt(&url).await {
                Ok(metadata) => return Ok(metadata),
                Err(e) if attempt < self.config.max_retries => {
                    let delay = backoff_delay(
                        attempt,
                        self.config.backoff_base(),
                        self.config.backoff_cap(),
                    );
                    tracing::debug!(%url, attempt, ?delay, error = %e, "metadata fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "metadata fetch failed");
                    return Err(e);
                }
            }
        }
    }
}
