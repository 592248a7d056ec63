//! doh-client - multi-provider DNS-over-HTTPS client
//!
//! This crate resolves DNS records by issuing JSON-format HTTPS queries to
//! public resolvers (Cloudflare, Google, Quad9, DNSPod) and returning a
//! single unified answer.
//!
//! Features:
//! - Races each query across several providers and returns the first
//!   successful response, cancelling the rest
//! - Tracks each provider's recent failure rate and routes follow-up
//!   queries to the most reliable one
//! - Optional bounded TTL cache that short-circuits identical repeat
//!   queries for the answer's natural lifetime
//! - IDNA (punycode) domain normalization and EDNS client subnet support
//!
//! # Example
//!
//! ```no_run
//! use doh_client::{DohClient, ProviderId, RecordType};
//!
//! # async fn example() -> doh_client::Result<()> {
//! // Empty set selects the built-in default providers
//! let client = DohClient::new(&[])?;
//! client.enable_cache(true).await;
//!
//! let response = client.query("likexian.com", RecordType::A).await?;
//! for answer in &response.answer {
//!     println!("{} {} {}", answer.name, answer.ttl, answer.data);
//! }
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Routing
//!
//! While the current statistics window is empty (at startup and right after
//! each 5 second reset) a query fans out to every provider, which seeds the
//! window. Once any provider has been observed, queries go only to the one
//! with the lowest failure rate; if that dispatch fails for any reason other
//! than cancellation, the query retries against the full set.

mod cache;
mod client;
mod dns;
pub mod error;
pub mod provider;
mod racer;
mod stats;

pub use cache::{CacheStats, ResponseCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
pub use client::{DohClient, STATS_RESET_INTERVAL};
pub use dns::{fingerprint, normalize_subnet, to_punycode, Answer, Question, RecordType, Response};
pub use error::{Error, Result};
pub use provider::{new_provider, Provider, ProviderId, Quad9Variant};
pub use stats::{ProviderStats, StatsEntry};
