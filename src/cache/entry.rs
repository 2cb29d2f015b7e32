//! Cache Entry Module
//!
//! Defines the structure for individual memoized entries with TTL support.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Opaque memoized value shared by all call sites.
///
/// The runtime cache stores heterogeneous results (routed requests, culture
/// codes, content nodes) in a single store, so values are type-erased and
/// downcast on retrieval.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

// == Cache Entry ==
/// Represents a single memoized entry with value and expiration metadata.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value
    value: CachedValue,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` after now.
    pub fn new(value: CachedValue, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl.as_millis() as u64),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is considered expired when the current
    /// time is greater than or equal to the expiration time. Expired entries
    /// are logically absent even while still physically stored.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Downcast ==
    /// Returns a clone of the stored value if it is of type `T`.
    ///
    /// A type mismatch means the key was last written by a different call
    /// site; callers treat that as a miss and overwrite.
    pub fn downcast<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds.
    ///
    /// Returns `0` once the entry has expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
