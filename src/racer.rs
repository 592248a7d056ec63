//! Concurrent provider fan-out
//!
//! Issues the same query against every selected provider in parallel and
//! returns the first successful response. The remaining workers are
//! cancelled as soon as a winner is known, but the race always waits for
//! every worker to report before returning, so no task outlives the call
//! and no statistics update is lost.

use std::sync::Arc;

use log::debug;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::cache::ResponseCache;
use crate::dns::{self, RecordType, Response};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::stats::ProviderStats;

/// Race one query across the given providers
///
/// Each provider is identified by its index in the client's provider table
/// so the outcome can be recorded in the shared statistics. When a cache is
/// installed, it is consulted before any provider is contacted and the
/// winning response is inserted afterwards with the answer's TTL.
///
/// Cancelling `cancel` (or dropping the returned future) aborts all
/// in-flight workers promptly.
pub(crate) async fn race(
    providers: &[(usize, Arc<dyn Provider>)],
    stats: &Arc<RwLock<ProviderStats>>,
    cache: &Arc<RwLock<Option<ResponseCache>>>,
    cancel: &CancellationToken,
    name: &str,
    rtype: RecordType,
    subnet: Option<&str>,
) -> Result<Response> {
    if providers.is_empty() {
        return Err(Error::AllFailed);
    }

    let key = dns::fingerprint(name, rtype, subnet);

    {
        let mut guard = cache.write().await;
        if let Some(c) = guard.as_mut() {
            if let Some(response) = c.get(&key) {
                debug!("cache hit for {} {}", name, rtype);
                return Ok(response);
            }
        }
    }

    let token = cancel.child_token();
    let _guard = token.clone().drop_guard();

    let (tx, mut rx) = mpsc::channel::<Option<Response>>(providers.len());

    for (index, provider) in providers {
        let index = *index;
        let provider = provider.clone();
        let stats = stats.clone();
        let token = token.clone();
        let tx = tx.clone();
        let name = name.to_string();
        let subnet = subnet.map(|s| s.to_string());

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(Error::Cancelled),
                r = provider.query(&name, rtype, subnet.as_deref()) => r,
            };

            stats.write().await.record(index, result.is_ok());

            match result {
                Ok(response) => {
                    let _ = tx.send(Some(response)).await;
                }
                Err(e) => {
                    debug!("{}: query failed: {}", provider.name(), e);
                    let _ = tx.send(None).await;
                }
            }
        });
    }
    drop(tx);

    // First success wins; keep draining so every worker reports
    let mut winner: Option<Response> = None;
    while let Some(outcome) = rx.recv().await {
        if let Some(response) = outcome {
            if winner.is_none() {
                debug!("{} answered first for {} {}", response.provider, name, rtype);
                token.cancel();
                winner = Some(response);
            }
        }
    }

    match winner {
        Some(response) => {
            let mut guard = cache.write().await;
            if let Some(c) = guard.as_mut() {
                let ttl = response.answer.first().map(|a| u64::from(a.ttl)).unwrap_or(0);
                c.insert(&key, &response, ttl);
            }
            Ok(response)
        }
        None if cancel.is_cancelled() => Err(Error::Cancelled),
        None => Err(Error::AllFailed),
    }
}
