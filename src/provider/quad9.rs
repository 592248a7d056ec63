//! Quad9 DoH provider

use async_trait::async_trait;

use super::{build_http_client, query_json, Provider};
use crate::dns::{RecordType, Response};
use crate::error::Result;

/// Quad9 endpoint variants
///
/// Quad9 operates several resolver tiers with different filtering and ECS
/// policies; the default tier does not receive the client subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quad9Variant {
    /// Security blocklist, DNSSEC, no EDNS client subnet
    #[default]
    Default,
    /// Security blocklist, DNSSEC, no EDNS client subnet (hostname endpoint)
    Secured,
    /// No security blocklist, no DNSSEC, no EDNS client subnet
    Unsecured,
    /// Security blocklist, DNSSEC, with EDNS client subnet
    SecuredEcs,
}

impl Quad9Variant {
    /// Endpoint URL for this variant
    pub fn endpoint(&self) -> &'static str {
        match self {
            Quad9Variant::Default => "https://9.9.9.9:5053/dns-query",
            Quad9Variant::Secured => "https://dns9.quad9.net:5053/dns-query",
            Quad9Variant::Unsecured => "https://dns10.quad9.net:5053/dns-query",
            Quad9Variant::SecuredEcs => "https://dns11.quad9.net/dns-query",
        }
    }
}

/// Quad9 JSON DoH adapter
pub struct Quad9 {
    endpoint: String,
    http: reqwest::Client,
}

impl Quad9 {
    /// Create an adapter for the default variant
    pub fn new() -> Result<Self> {
        Self::with_variant(Quad9Variant::Default)
    }

    /// Create an adapter for a specific endpoint variant
    pub fn with_variant(variant: Quad9Variant) -> Result<Self> {
        Self::with_endpoint(variant.endpoint())
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
impl Provider for Quad9 {
    fn name(&self) -> &'static str {
        "quad9"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_endpoints() {
        assert_eq!(
            Quad9Variant::Default.endpoint(),
            "https://9.9.9.9:5053/dns-query"
        );
        assert_eq!(
            Quad9Variant::SecuredEcs.endpoint(),
            "https://dns11.quad9.net/dns-query"
        );
    }

    #[test]
    fn test_default_variant() {
        assert_eq!(Quad9Variant::default(), Quad9Variant::Default);
    }
}
