//! Mock provider implementation for testing
//!
//! Simulates an upstream with a fixed latency and a scripted outcome, so
//! racing, routing and caching behavior can be exercised without network
//! access. The reported TTL counts down by one on every call, mimicking a
//! live upstream whose records age between queries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::Provider;
use crate::dns::{Answer, Question, RecordType, Response};
use crate::error::{Error, Result};

/// Scripted in-memory provider
pub struct MockProvider {
    name: &'static str,
    delay: Duration,
    answer_ttl: Option<u32>,
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// A provider that answers every query after `delay`
    pub fn succeeding(name: &'static str, delay: Duration, answer_ttl: u32) -> Self {
        Self {
            name,
            delay,
            answer_ttl: Some(answer_ttl),
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider that fails every query after `delay`
    pub fn failing(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            answer_ttl: None,
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make the provider start failing once it has answered `calls` times
    pub fn fail_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    /// Number of queries this provider has received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn query(
        &self,
        name: &str,
        _rtype: RecordType,
        _subnet: Option<&str>,
    ) -> Result<Response> {
        let seq = self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failed = self.answer_ttl.is_none() || self.fail_after.is_some_and(|n| seq >= n);
        if failed {
            return Err(Error::Transport {
                provider: self.name,
                message: "mock failure".to_string(),
            });
        }

        let ttl = self.answer_ttl.unwrap_or(0).saturating_sub(seq as u32);
        Ok(Response {
            status: 0,
            rd: true,
            ra: true,
            question: vec![Question {
                name: name.to_string(),
                rtype: 1,
            }],
            answer: vec![Answer {
                name: name.to_string(),
                rtype: 1,
                ttl,
                data: "127.0.0.1".to_string(),
            }],
            provider: self.name.to_string(),
            ..Response::default()
        })
    }
}
