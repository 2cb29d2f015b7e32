//! Preview Cache - memoized CMS preview lookups
//!
//! Wraps a shared TTL runtime cache with get-or-compute semantics and uses
//! it to memoize the three short-lived lookups a preview render repeats for
//! the same page: routed-request construction, culture resolution, and
//! content fetch. The surrounding CMS is reached through capability traits
//! in [`host`].

pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod models;
pub mod preview;
pub mod tasks;

pub use cache::RuntimeCache;
pub use config::Config;
pub use error::{PreviewError, Result};
pub use preview::PreviewContextService;
pub use tasks::spawn_cleanup_task;
