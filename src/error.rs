//! Error types for DoH operations

use thiserror::Error;

use crate::dns::{RecordType, Response};

/// Result type alias for DoH operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during DoH operations
#[derive(Debug, Error)]
pub enum Error {
    /// Domain name rejected by IDNA normalization
    #[error("invalid domain name: {0}")]
    InvalidDomain(String),

    /// Client subnet is not a valid IP or CIDR
    #[error("invalid client subnet: {0}")]
    InvalidSubnet(String),

    /// HTTP/TLS/I-O failure or non-2xx status from the upstream
    #[error("{provider}: transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// Upstream body could not be decoded
    #[error("{provider}: decode error: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// Upstream answered with a non-zero DNS status code.
    ///
    /// The decoded response is carried for inspection.
    #[error("{provider}: bad response code: {status}")]
    DnsStatus {
        provider: &'static str,
        status: i32,
        response: Box<Response>,
    },

    /// Provider cannot serve this record type
    #[error("{provider}: unsupported record type: {rtype}")]
    Unsupported {
        provider: &'static str,
        rtype: RecordType,
    },

    /// Every raced provider failed
    #[error("all query failed")]
    AllFailed,

    /// The query was cancelled or the client was closed
    #[error("query cancelled")]
    Cancelled,

    /// Client configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
