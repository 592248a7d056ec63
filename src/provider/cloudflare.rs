//! Cloudflare DoH provider

use async_trait::async_trait;

use super::{build_http_client, query_json, Provider};
use crate::dns::{RecordType, Response};
use crate::error::Result;

/// Default Cloudflare DoH endpoint
pub const CLOUDFLARE_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";

/// Cloudflare JSON DoH adapter
///
/// Supports all record types and the EDNS client subnet option.
pub struct Cloudflare {
    endpoint: String,
    http: reqwest::Client,
}

impl Cloudflare {
    /// Create an adapter for the default endpoint
    pub fn new() -> Result<Self> {
        Self::with_endpoint(CLOUDFLARE_ENDPOINT)
    }

    /// Create an adapter for a custom endpoint
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            http: build_http_client()?,
        })
    }
}

#[async_trait]
impl Provider for Cloudflare {
    fn name(&self) -> &'static str {
        "cloudflare"
    }

    async fn query(
        &self,
        name: &str,
        rtype: RecordType,
        subnet: Option<&str>,
    ) -> Result<Response> {
        query_json(&self.http, &self.endpoint, self.name(), name, rtype, subnet).await
    }
}
