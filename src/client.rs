//! Multi-provider DoH client
//!
//! The client owns the provider set, the per-provider failure statistics,
//! the optional response cache and the background window-reset ticker, and
//! routes each query either to the most reliable provider of the current
//! window or, when nothing has been observed yet, to the full set at once.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheStats, ResponseCache, DEFAULT_MAX_ENTRIES};
use crate::dns::{self, RecordType, Response};
use crate::error::{Error, Result};
use crate::provider::{new_provider, Provider, ProviderId};
use crate::racer;
use crate::stats::{ProviderStats, StatsEntry};

/// Interval between statistics window resets
pub const STATS_RESET_INTERVAL: Duration = Duration::from_secs(5);

/// Multi-provider DoH client
///
/// Races queries across its providers, tracks each provider's recent
/// failure rate to bias routing, and optionally caches responses for their
/// natural TTL.
pub struct DohClient {
    providers: Vec<Arc<dyn Provider>>,
    stats: Arc<RwLock<ProviderStats>>,
    cache: Arc<RwLock<Option<ResponseCache>>>,
    cache_capacity: usize,
    shutdown: CancellationToken,
}

impl DohClient {
    /// Create a client for the given providers
    ///
    /// An empty slice selects the built-in default set (Cloudflare, DNSPod,
    /// Google, Quad9). Must be called within a Tokio runtime: the client
    /// spawns the statistics-reset ticker at construction.
    pub fn new(ids: &[ProviderId]) -> Result<Self> {
        let ids = if ids.is_empty() {
            &ProviderId::DEFAULT_SET[..]
        } else {
            ids
        };

        let providers = ids
            .iter()
            .map(|id| new_provider(*id))
            .collect::<Result<Vec<_>>>()?;

        Self::with_providers(providers)
    }

    /// Create a client from already-constructed providers
    ///
    /// Used to inject custom endpoints or mock providers.
    pub fn with_providers(providers: Vec<Arc<dyn Provider>>) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::Config("no providers configured".to_string()));
        }

        info!("creating DoH client with {} providers", providers.len());

        let stats = Arc::new(RwLock::new(ProviderStats::new()));
        let shutdown = CancellationToken::new();
        spawn_reset_ticker(stats.clone(), shutdown.clone());

        Ok(Self {
            providers,
            stats,
            cache: Arc::new(RwLock::new(None)),
            cache_capacity: DEFAULT_MAX_ENTRIES,
            shutdown,
        })
    }

    /// Set the capacity used when the response cache is enabled
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Enable or disable the response cache
    ///
    /// Enabling installs a fresh bounded TTL cache; disabling closes and
    /// removes any existing one. Idempotent.
    pub async fn enable_cache(&self, enabled: bool) -> &Self {
        let mut cache = self.cache.write().await;
        if enabled {
            if cache.is_none() {
                debug!("response cache enabled");
                *cache = Some(ResponseCache::new(self.cache_capacity));
            }
        } else if let Some(mut existing) = cache.take() {
            debug!("response cache disabled");
            existing.close();
        }
        self
    }

    /// Resolve a domain
    pub async fn query(&self, name: &str, rtype: RecordType) -> Result<Response> {
        self.dispatch(name, rtype, None).await
    }

    /// Resolve a domain with an EDNS client subnet
    ///
    /// The subnet may be a bare IP or a CIDR; an empty string is equivalent
    /// to no subnet.
    pub async fn query_with_subnet(
        &self,
        name: &str,
        rtype: RecordType,
        subnet: &str,
    ) -> Result<Response> {
        let subnet = subnet.trim();
        self.dispatch(name, rtype, (!subnet.is_empty()).then_some(subnet))
            .await
    }

    async fn dispatch(
        &self,
        name: &str,
        rtype: RecordType,
        subnet: Option<&str>,
    ) -> Result<Response> {
        if self.shutdown.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Normalize before racing so invalid input surfaces directly instead
        // of draining into an all-failed race, and so the cache fingerprint
        // sees the canonical form. Providers normalize their own input too,
        // which is a no-op on values that are already canonical.
        let name = dns::to_punycode(name)?;
        let subnet = match subnet {
            Some(s) => Some(dns::normalize_subnet(s)?),
            None => None,
        };
        let subnet = subnet.as_deref();

        if let Some(index) = self.stats.read().await.best() {
            let provider = self.providers[index].clone();
            debug!("routing {} {} to {}", name, rtype, provider.name());

            let selection = [(index, provider)];
            match racer::race(
                &selection,
                &self.stats,
                &self.cache,
                &self.shutdown,
                &name,
                rtype,
                subnet,
            )
            .await
            {
                Ok(response) => return Ok(response),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    debug!(
                        "{}: preferred provider failed, retrying with full set: {}",
                        selection[0].1.name(),
                        e
                    );
                }
            }
        }

        let selection: Vec<(usize, Arc<dyn Provider>)> =
            self.providers.iter().cloned().enumerate().collect();

        racer::race(
            &selection,
            &self.stats,
            &self.cache,
            &self.shutdown,
            &name,
            rtype,
            subnet,
        )
        .await
    }

    /// Failure counters recorded for each provider in the current window
    pub async fn provider_stats(&self) -> Vec<(&'static str, StatsEntry)> {
        let stats = self.stats.read().await;
        self.providers
            .iter()
            .enumerate()
            .filter_map(|(index, provider)| {
                stats.get(index).map(|entry| (provider.name(), entry.clone()))
            })
            .collect()
    }

    /// Statistics of the response cache, if one is enabled
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.read().await.as_ref().map(|c| c.stats().clone())
    }

    /// Shut the client down
    ///
    /// Stops the reset ticker, cancels in-flight queries and closes the
    /// cache. Idempotent; queries issued after close fail with
    /// [`Error::Cancelled`].
    pub async fn close(&self) {
        self.shutdown.cancel();
        if let Some(mut cache) = self.cache.write().await.take() {
            cache.close();
        }
    }
}

fn spawn_reset_ticker(stats: Arc<RwLock<ProviderStats>>, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STATS_RESET_INTERVAL);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    debug!("resetting provider statistics window");
                    stats.write().await.reset();
                }
            }
        }
    });
}
