//! Per-provider failure statistics
//!
//! Tracks a short-horizon failure rate for each provider so the client can
//! route queries to whichever upstream has been most reliable recently. The
//! table is reset on a fixed window by the client's background ticker, so
//! stale failures do not condemn a provider forever.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Counters for a single provider within the current window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsEntry {
    /// Failed attempts in this window
    pub errors: u64,
    /// Total attempts in this window
    pub attempts: u64,
}

impl StatsEntry {
    /// Failure rate in [0, 1], or `None` while the provider is unobserved
    ///
    /// An unobserved provider is treated as worst case: any provider with at
    /// least one recorded attempt ranks ahead of it.
    pub fn failure_rate(&self) -> Option<f64> {
        if self.attempts == 0 {
            None
        } else {
            Some(self.errors as f64 / self.attempts as f64)
        }
    }
}

/// Failure-rate table for the configured providers
///
/// Holds at most one entry per provider index.
#[derive(Debug, Clone, Default)]
pub struct ProviderStats {
    entries: HashMap<usize, StatsEntry>,
}

impl ProviderStats {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one attempt against a provider
    pub fn record(&mut self, provider: usize, success: bool) {
        let entry = self.entries.entry(provider).or_default();
        entry.attempts += 1;
        if !success {
            entry.errors += 1;
        }
    }

    /// Provider with the lowest failure rate this window
    ///
    /// Ties break toward the lowest provider index. Returns `None` when
    /// nothing has been recorded since the last reset.
    pub fn best(&self) -> Option<usize> {
        self.entries
            .iter()
            .filter_map(|(index, entry)| entry.failure_rate().map(|rate| (*index, rate)))
            .min_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            })
            .map(|(index, _)| index)
    }

    /// Get the counters recorded for a provider, if any
    pub fn get(&self, provider: usize) -> Option<&StatsEntry> {
        self.entries.get(&provider)
    }

    /// Clear all entries, starting a fresh window
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_has_no_best() {
        assert_eq!(ProviderStats::new().best(), None);
    }

    #[test]
    fn test_best_prefers_lowest_failure_rate() {
        let mut stats = ProviderStats::new();
        stats.record(0, false);
        stats.record(0, true);
        stats.record(1, true);
        stats.record(1, true);

        assert_eq!(stats.best(), Some(1));
    }

    #[test]
    fn test_best_tie_breaks_to_lowest_index() {
        let mut stats = ProviderStats::new();
        stats.record(2, true);
        stats.record(1, true);
        stats.record(3, true);

        assert_eq!(stats.best(), Some(1));
    }

    #[test]
    fn test_observed_failure_beats_unobserved() {
        // Provider 0 was never attempted; provider 1 failed every attempt.
        // An observed provider still wins over an unknown one.
        let mut stats = ProviderStats::new();
        stats.record(1, false);

        assert_eq!(stats.best(), Some(1));
    }

    #[test]
    fn test_failure_rate() {
        let mut stats = ProviderStats::new();
        stats.record(0, false);
        stats.record(0, false);
        stats.record(0, true);
        stats.record(0, true);

        let entry = stats.get(0).unwrap();
        assert_eq!(entry.attempts, 4);
        assert_eq!(entry.errors, 2);
        assert_eq!(entry.failure_rate(), Some(0.5));
        assert!(entry.attempts >= entry.errors);
    }

    #[test]
    fn test_unobserved_rate_is_none() {
        assert_eq!(StatsEntry::default().failure_rate(), None);
    }

    #[test]
    fn test_reset_clears_entries() {
        let mut stats = ProviderStats::new();
        stats.record(0, true);
        stats.reset();

        assert_eq!(stats.best(), None);
        assert_eq!(stats.get(0), None);
    }
}
