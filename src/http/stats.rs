//! Request counters for the shared HTTP client
//!
//! Counters are plain atomics so the client can be cloned freely and shared
//! across operations; a [`StatsSnapshot`] is a copy taken at one point in time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters updated by every request attempt
#[derive(Debug, Default)]
pub struct HttpStats {
    requests: AtomicU64,
    successes: AtomicU64,
    errors: AtomicU64,
    retries: AtomicU64,
    not_found: AtomicU64,
    bytes_received: AtomicU64,
    latency_micros: AtomicU64,
}

impl HttpStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one attempt (initial request or retry)
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, bytes: usize) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Counts an operation-level failure (after retries, or a permanent error)
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_latency(&self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.latency_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            total_latency: Duration::from_micros(self.latency_micros.load(Ordering::Relaxed)),
        }
    }
}

/// Point-in-time copy of [`HttpStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Attempts sent, including retries
    pub requests: u64,
    pub successes: u64,
    pub errors: u64,
    pub retries: u64,
    /// 404 responses surfaced as absent values
    pub not_found: u64,
    pub bytes_received: u64,
    pub total_latency: Duration,
}

impl StatsSnapshot {
    /// Mean latency per attempt
    pub fn average_latency(&self) -> Option<Duration> {
        if self.requests == 0 {
            return None;
        }
        let requests = u32::try_from(self.requests).unwrap_or(u32::MAX);
        Some(self.total_latency / requests)
    }

    /// Failed operations as a percentage of attempts
    pub fn error_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        (self.errors as f64 / self.requests as f64) * 100.0
    }
}
