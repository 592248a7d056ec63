//! Google DoH provider

use async_trait::async_trait;

use super::{build_http_client, query_json, Provider};
use crate::dns::{RecordType, Response};
use crate::error::Result;

/// Default Google DoH endpoint
pub const GOOGLE_ENDPOINT: &str = "https://dns.google.com/resolve";

/// Google JSON DoH adapter
///
/// Supports all record types and the EDNS client subnet option.
pub struct Google {
    endpoint: String,
    http: reqwest::Client,
}

impl Google {
    /// Create an adapter for the default endpoint
    pub fn new() -> Result<Self> {
        Self::with_endpoint(GOOGLE_ENDPOINT)
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
impl Provider for Google {
    fn name(&self) -> &'static str {
        "google"
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
