//! Metrics registry for chirpy
//!
//! - Counters only
//! - Monotonic increase, except the file-server hit counter which the
//!   admin reset endpoint zeroes
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters
///
/// All counters use Relaxed ordering; they are independent of each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Requests served from /app
    fileserver_hits: AtomicU64,
    /// Chirps stored
    chirps_created: AtomicU64,
    /// Users registered
    users_created: AtomicU64,
    /// Logins that produced a token
    logins_succeeded: AtomicU64,
    /// Logins rejected for bad credentials
    logins_failed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one static file request
    pub fn increment_fileserver_hits(&self) {
        self.fileserver_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Get file-server hits
    pub fn fileserver_hits(&self) -> u64 {
        self.fileserver_hits.load(Ordering::Relaxed)
    }

    /// Zero the file-server hit counter
    pub fn reset_hits(&self) {
        self.fileserver_hits.store(0, Ordering::Relaxed);
    }

    pub fn increment_chirps_created(&self) {
        self.chirps_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_users_created(&self) {
        self.users_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_logins_succeeded(&self) {
        self.logins_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_logins_failed(&self) {
        self.logins_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fileserver_hits: self.fileserver_hits.load(Ordering::Relaxed),
            chirps_created: self.chirps_created.load(Ordering::Relaxed),
            users_created: self.users_created.load(Ordering::Relaxed),
            logins_succeeded: self.logins_succeeded.load(Ordering::Relaxed),
            logins_failed: self.logins_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub fileserver_hits: u64,
    pub chirps_created: u64,
    pub users_created: u64,
    pub logins_succeeded: u64,
    pub logins_failed: u64,
}
