/// HTTP transport used to follow a canonical endpoint's redirects.
/// The resolver only needs the final URI, so the trait is that narrow.
use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::errors::ResolveError;

/// Follows redirects for a GET and reports where the request ended up.
///
/// Implementations must be safe to share between concurrent resolutions.
#[async_trait]
pub trait RedirectFollower: Send + Sync {
    async fn follow(&self, uri: &str) -> Result<Url, ResolveError>;
}

/// Lowest TLS version the transport will negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsFloor {
    /// services.odata.org refuses anything older.
    #[default]
    Tls12,
    Tls13,
}

impl TlsFloor {
    fn version(self) -> reqwest::tls::Version {
        match self {
            TlsFloor::Tls12 => reqwest::tls::Version::TLS_1_2,
            TlsFloor::Tls13 => reqwest::tls::Version::TLS_1_3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub min_tls: TlsFloor,
    /// Total time for the request, redirects included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            min_tls: TlsFloor::Tls12,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_redirects: 10,
            user_agent: concat!("odata-endpoint/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `reqwest`-backed transport. Cloning shares the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .min_tls_version(config.min_tls.version())
            .redirect(Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RedirectFollower for HttpTransport {
    async fn follow(&self, uri: &str) -> Result<Url, ResolveError> {
        let parsed = Url::parse(uri)
            .map_err(|e| ResolveError::InvalidEndpoint(format!("{}: {}", uri, e)))?;

        debug!(uri = %parsed, "following redirects");
        let resp = self.client.get(parsed).send().await.map_err(|e| {
            warn!("Redirect lookup for {} failed: {}", uri, e);
            ResolveError::from(e)
        })?;

        // Only the landing URI matters; the status and body are the service's business.
        let landed = resp.url().clone();
        debug!(status = %resp.status(), landed = %landed, "redirects followed");
        Ok(landed)
    }
}
