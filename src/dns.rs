//! DNS data model for the JSON DoH wire format
//!
//! Covers the record types and response shape shared by the Cloudflare,
//! Google and Quad9 JSON endpoints, plus the normalization helpers every
//! provider applies before transmission: IDNA punycode conversion of the
//! domain and canonicalization of the EDNS client subnet.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// DNS record types supported by the JSON DoH endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Spf,
    Ns,
    Soa,
    Ptr,
    Any,
}

impl RecordType {
    /// Get the textual name used in the `type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Spf => "SPF",
            RecordType::Ns => "NS",
            RecordType::Soa => "SOA",
            RecordType::Ptr => "PTR",
            RecordType::Any => "ANY",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "TXT" => Ok(RecordType::Txt),
            "SPF" => Ok(RecordType::Spf),
            "NS" => Ok(RecordType::Ns),
            "SOA" => Ok(RecordType::Soa),
            "PTR" => Ok(RecordType::Ptr),
            "ANY" => Ok(RecordType::Any),
            _ => Err(Error::Config(format!("unknown record type '{}'", s))),
        }
    }
}

/// Question section entry, with the numeric RR type per IANA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Question {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: u16,
}

/// Answer section entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Answer {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: u16,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub data: String,
}

/// Decoded DoH response
///
/// `status == 0` is NOERROR; any other value is a DNS-level failure.
/// `provider` records which upstream produced the answer and is stamped by
/// the provider adapter, not the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Response {
    #[serde(rename = "Status")]
    pub status: i32,
    #[serde(rename = "TC")]
    pub tc: bool,
    #[serde(rename = "RD")]
    pub rd: bool,
    #[serde(rename = "RA")]
    pub ra: bool,
    #[serde(rename = "AD")]
    pub ad: bool,
    #[serde(rename = "CD")]
    pub cd: bool,
    #[serde(rename = "Question")]
    pub question: Vec<Question>,
    #[serde(rename = "Answer")]
    pub answer: Vec<Answer>,
    pub provider: String,
}

/// Convert a domain name to its ASCII (punycode) form
///
/// Uses the IDNA lookup profile with transitional mapping and non-strict
/// domain-name checks, so unicode names like `www.网络.cn` become an ASCII
/// form the upstreams accept.
pub fn to_punycode(name: &str) -> Result<String> {
    let name = name.trim();
    idna::Config::default()
        .transitional_processing(true)
        .use_std3_ascii_rules(false)
        .to_ascii(name)
        .map_err(|_| Error::InvalidDomain(name.to_string()))
}

/// Canonicalize an EDNS client subnet
///
/// Accepts a bare IP (`1.1.1.1`) or a CIDR (`1.1.1.1/24`) and returns the
/// canonical network form (`1.1.1.1/32`, `1.1.1.0/24`).
pub fn normalize_subnet(subnet: &str) -> Result<String> {
    let s = subnet.trim();

    let net = if s.contains('/') {
        IpNet::from_str(s).map_err(|_| Error::InvalidSubnet(s.to_string()))?
    } else {
        let ip: IpAddr = s.parse().map_err(|_| Error::InvalidSubnet(s.to_string()))?;
        let prefix = if ip.is_ipv4() { 32 } else { 128 };
        IpNet::new(ip, prefix).map_err(|_| Error::InvalidSubnet(s.to_string()))?
    };

    Ok(net.trunc().to_string())
}

/// Fingerprint of a query's significant parameters, used as the cache key
///
/// SHA-1 hex digest over the normalized (domain, type, subnet) triple.
pub fn fingerprint(name: &str, rtype: RecordType, subnet: Option<&str>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(name.as_bytes());
    hasher.update(b":");
    hasher.update(rtype.as_str().as_bytes());
    hasher.update(b":");
    if let Some(s) = subnet {
        hasher.update(s.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punycode_ascii_passthrough() {
        assert_eq!(to_punycode("likexian.com").unwrap(), "likexian.com");
        assert_eq!(to_punycode("  likexian.com  ").unwrap(), "likexian.com");
    }

    #[test]
    fn test_punycode_lowercases() {
        assert_eq!(to_punycode("LIKEXIAN.COM").unwrap(), "likexian.com");
    }

    #[test]
    fn test_punycode_unicode() {
        assert_eq!(to_punycode("www.网络.cn").unwrap(), "www.xn--io0a7i.cn");
    }

    #[test]
    fn test_normalize_subnet_bare_ip() {
        assert_eq!(normalize_subnet("1.1.1.1").unwrap(), "1.1.1.1/32");
        assert_eq!(normalize_subnet("2001:db8::1").unwrap(), "2001:db8::1/128");
    }

    #[test]
    fn test_normalize_subnet_cidr() {
        assert_eq!(normalize_subnet("1.1.1.1/24").unwrap(), "1.1.1.0/24");
        assert_eq!(normalize_subnet("1.1.1.0/24").unwrap(), "1.1.1.0/24");
    }

    #[test]
    fn test_normalize_subnet_invalid() {
        assert!(normalize_subnet("not-an-ip").is_err());
        assert!(normalize_subnet("1.2.3.4/33").is_err());
        assert!(normalize_subnet("").is_err());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint("likexian.com", RecordType::A, None);
        let b = fingerprint("likexian.com", RecordType::A, None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_fingerprint_distinguishes_parameters() {
        let base = fingerprint("likexian.com", RecordType::A, None);
        assert_ne!(base, fingerprint("likexian.org", RecordType::A, None));
        assert_ne!(base, fingerprint("likexian.com", RecordType::Aaaa, None));
        assert_ne!(
            base,
            fingerprint("likexian.com", RecordType::A, Some("1.1.1.0/24"))
        );
    }

    #[test]
    fn test_record_type_display() {
        assert_eq!(RecordType::A.to_string(), "A");
        assert_eq!(RecordType::Aaaa.to_string(), "AAAA");
        assert_eq!(RecordType::Any.as_str(), "ANY");
    }

    #[test]
    fn test_record_type_from_str() {
        assert_eq!("A".parse::<RecordType>().unwrap(), RecordType::A);
        assert_eq!("AAAA".parse::<RecordType>().unwrap(), RecordType::Aaaa);
        assert_eq!("cname".parse::<RecordType>().unwrap(), RecordType::Cname);
        assert_eq!(" mx ".parse::<RecordType>().unwrap(), RecordType::Mx);
    }

    #[test]
    fn test_record_type_round_trips() {
        for rtype in [
            RecordType::A,
            RecordType::Aaaa,
            RecordType::Cname,
            RecordType::Mx,
            RecordType::Txt,
            RecordType::Spf,
            RecordType::Ns,
            RecordType::Soa,
            RecordType::Ptr,
            RecordType::Any,
        ] {
            assert_eq!(rtype.as_str().parse::<RecordType>().unwrap(), rtype);
        }
    }

    #[test]
    fn test_record_type_from_str_invalid() {
        assert!("HINFO".parse::<RecordType>().is_err());
        assert!("".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_response_decode() {
        let body = r#"{
            "Status": 0,
            "TC": false,
            "RD": true,
            "RA": true,
            "AD": false,
            "CD": false,
            "Question": [{"name": "likexian.com.", "type": 1}],
            "Answer": [{"name": "likexian.com.", "type": 1, "TTL": 299, "data": "1.2.3.4"}]
        }"#;

        let response: Response = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, 0);
        assert!(response.rd);
        assert_eq!(response.question[0].rtype, 1);
        assert_eq!(response.answer[0].ttl, 299);
        assert_eq!(response.answer[0].data, "1.2.3.4");
        assert!(response.provider.is_empty());
    }

    #[test]
    fn test_response_decode_missing_sections() {
        // NXDOMAIN bodies omit the Answer section entirely
        let body = r#"{"Status": 3, "TC": false, "RD": true, "RA": true, "AD": false, "CD": false}"#;
        let response: Response = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, 3);
        assert!(response.question.is_empty());
        assert!(response.answer.is_empty());
    }
}
