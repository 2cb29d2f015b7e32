//! Cache Module
//!
//! Provides keyed, TTL-based memoization: cached values are returned while
//! unexpired, otherwise a caller-supplied compute function is invoked and
//! its result stored.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CachedValue};
pub use stats::CacheStats;
pub use store::RuntimeCache;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
