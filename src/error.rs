//! Error types for the preview cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Preview Error Enum ==
/// Unified error type for the preview cache.
///
/// Collaborator unavailability and not-found content are deliberately *not*
/// errors; those operations return `None` instead. Only invalid inputs and
/// failed compute functions surface here.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// Cache key is empty or exceeds the maximum length
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// The incoming request cannot be resolved to a display URL
    #[error("Invalid display URL: {0}")]
    InvalidUrl(String),

    /// The routing collaborator failed to build a request
    #[error("Request routing failed: {0}")]
    Routing(String),
}

// == Result Type Alias ==
/// Convenience Result type for the preview cache.
pub type Result<T> = std::result::Result<T, PreviewError>;
