//! Preview Module
//!
//! The three memoized preview lookups: routed-request construction, culture
//! resolution, and content fetch. Each is a thin wrapper configuring the
//! runtime cache with a key template and a compute function.

mod keys;
mod service;

pub use service::{PreviewContextService, UNDEFINED_CULTURE};
