//! DNSPod provider
//!
//! DNSPod does not speak the JSON DoH format. It exposes a plain HTTP
//! endpoint that answers `A` lookups with a text body of the form
//! `ip1;ip2,ttl`, which this adapter parses into a synthetic [`Response`].

use std::net::IpAddr;

use async_trait::async_trait;

use super::{build_http_client, Provider};
use crate::dns::{self, Answer, Question, RecordType, Response};
use crate::error::{Error, Result};

/// Default DNSPod endpoint
pub const DNSPOD_ENDPOINT: &str = "http://119.29.29.29/d";

/// DNSPod HttpDNS adapter
///
/// Supports only `A` queries. The client subnet option is sent as a bare IP
/// with the prefix stripped.
pub struct DnsPod {
    endpoint: String,
    http: reqwest::Client,
}

impl DnsPod {
    /// Create an adapter for the default endpoint
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DNSPOD_ENDPOINT)
    }

    /// Create an adapter for a custom endpoint
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            http: build_http_client()?,
        })
    }
}

/// Parse a `ip1;ip2,ttl` body into answer records
fn parse_answers(name: &str, body: &str) -> Vec<Answer> {
    let (ips, ttl) = match body.split_once(',') {
        Some((ips, ttl)) => (ips, ttl.parse::<u32>().unwrap_or(0)),
        None => (body, 0),
    };

    ips.split(';')
        .filter(|v| v.parse::<IpAddr>().is_ok())
        .map(|v| Answer {
            name: name.to_string(),
            rtype: 1,
            ttl,
            data: v.to_string(),
        })
        .collect()
}

#[async_trait]
impl Provider for DnsPod {
    fn name(&self) -> &'static str {
        "dnspod"
    }

    async fn query(
        &self,
        name: &str,
        rtype: RecordType,
        subnet: Option<&str>,
    ) -> Result<Response> {
        if rtype != RecordType::A {
            return Err(Error::Unsupported {
                provider: self.name(),
                rtype,
            });
        }

        let name = dns::to_punycode(name)?;

        let mut params: Vec<(&str, String)> =
            vec![("dn", name.clone()), ("ttl", "1".to_string())];

        if let Some(s) = subnet {
            let s = s.trim();
            if !s.is_empty() {
                let cidr = dns::normalize_subnet(s)?;
                let ip = cidr.split('/').next().unwrap_or(&cidr);
                params.push(("ip", ip.to_string()));
            }
        }

        let rsp = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::Transport {
                provider: self.name(),
                message: e.to_string(),
            })?;

        let status = rsp.status();
        if !status.is_success() {
            return Err(Error::Transport {
                provider: self.name(),
                message: format!("bad status code: {}", status.as_u16()),
            });
        }

        let body = rsp.text().await.map_err(|e| Error::Transport {
            provider: self.name(),
            message: e.to_string(),
        })?;

        let mut response = Response {
            status: 0,
            rd: true,
            ra: true,
            question: vec![Question {
                name: name.clone(),
                rtype: 1,
            }],
            provider: self.name().to_string(),
            ..Response::default()
        };

        let body = body.trim();
        if body.is_empty() {
            // An empty body means the name did not resolve
            response.status = 3;
            return Err(Error::DnsStatus {
                provider: self.name(),
                status: 3,
                response: Box::new(response),
            });
        }

        response.answer = parse_answers(&name, body);
        Ok(response)
    }
}
