//! DoH provider adapters
//!
//! Each adapter issues one query to one public resolver and decodes the
//! result into the common [`Response`] model. Cloudflare, Google and Quad9
//! speak the JSON DoH format; DNSPod uses a non-standard plain-text endpoint.
//!
//! The [`mock`] module provides a scripted provider for testing without
//! network access.

mod cloudflare;
mod dnspod;
mod google;
pub mod mock;
mod quad9;

pub use cloudflare::Cloudflare;
pub use dnspod::DnsPod;
pub use google::Google;
pub use quad9::{Quad9, Quad9Variant};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::dns::{self, RecordType, Response};
use crate::error::{Error, Result};

/// Total request timeout for one upstream query
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

const USER_AGENT: &str = concat!("DoH Client/", env!("CARGO_PKG_VERSION"));

/// A single DoH upstream
///
/// Implementations are immutable after construction and shared by reference
/// between the client and all concurrent race tasks.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable short identifier, used in `Response::provider` and in errors
    fn name(&self) -> &'static str;

    /// Perform one DoH query
    ///
    /// Normalizes the domain via IDNA and a non-empty subnet to a canonical
    /// CIDR before transmission; attaches the subnet when the upstream
    /// supports it and silently omits it otherwise.
    async fn query(
        &self,
        name: &str,
        rtype: RecordType,
        subnet: Option<&str>,
    ) -> Result<Response>;
}

/// Built-in providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Cloudflare,
    DnsPod,
    Google,
    Quad9,
}

impl ProviderId {
    /// The default provider set used when none is specified
    pub const DEFAULT_SET: [ProviderId; 4] = [
        ProviderId::Cloudflare,
        ProviderId::DnsPod,
        ProviderId::Google,
        ProviderId::Quad9,
    ];
}

/// Construct a provider by id
pub fn new_provider(id: ProviderId) -> Result<Arc<dyn Provider>> {
    Ok(match id {
        ProviderId::Cloudflare => Arc::new(Cloudflare::new()?),
        ProviderId::DnsPod => Arc::new(DnsPod::new()?),
        ProviderId::Google => Arc::new(Google::new()?),
        ProviderId::Quad9 => Arc::new(Quad9::new()?),
    })
}

/// Build the HTTP client shared settings for an adapter
pub(crate) fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(HTTP_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))
}

/// Issue a JSON-format DoH query and decode the response
///
/// Shared by the Cloudflare, Google and Quad9 adapters, which differ only in
/// endpoint. A non-zero DNS status is an error that still carries the
/// decoded response for inspection.
pub(crate) async fn query_json(
    http: &reqwest::Client,
    endpoint: &str,
    provider: &'static str,
    name: &str,
    rtype: RecordType,
    subnet: Option<&str>,
) -> Result<Response> {
    let name = dns::to_punycode(name)?;

    let mut params: Vec<(&str, String)> =
        vec![("name", name), ("type", rtype.as_str().to_string())];

    if let Some(s) = subnet {
        let s = s.trim();
        if !s.is_empty() {
            params.push(("edns_client_subnet", dns::normalize_subnet(s)?));
        }
    }

    let rsp = http
        .get(endpoint)
        .query(&params)
        .header("Accept", "application/dns-json")
        .send()
        .await
        .map_err(|e| Error::Transport {
            provider,
            message: e.to_string(),
        })?;

    let status = rsp.status();
    if !status.is_success() {
        return Err(Error::Transport {
            provider,
            message: format!("bad status code: {}", status.as_u16()),
        });
    }

    let body = rsp.text().await.map_err(|e| Error::Transport {
        provider,
        message: e.to_string(),
    })?;

    let mut response: Response = serde_json::from_str(&body).map_err(|e| Error::Decode {
        provider,
        message: e.to_string(),
    })?;
    response.provider = provider.to_string();

    if response.status != 0 {
        let status = response.status;
        return Err(Error::DnsStatus {
            provider,
            status,
            response: Box::new(response),
        });
    }

    Ok(response)
}
