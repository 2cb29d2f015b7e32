//! Request models
//!
//! The incoming HTTP request as seen by the preview pipeline, and the routed
//! request the routing collaborator materializes from it.

use serde::{Deserialize, Serialize};

use crate::error::{PreviewError, Result};
use crate::models::ContentNode;

/// The incoming request a preview render is served for.
///
/// Only the pieces needed to reconstruct the display URL are carried; the
/// full request stays with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingRequest {
    /// URL scheme, e.g. "https"
    pub scheme: String,
    /// Host name, optionally with port
    pub host: String,
    /// Path plus query string, e.g. "/blog?page=2"
    pub path_and_query: String,
}

impl IncomingRequest {
    /// Creates a new IncomingRequest.
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path_and_query: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path_and_query: path_and_query.into(),
        }
    }

    /// Reconstructs the full display URL of the request.
    ///
    /// # Errors
    /// Returns `PreviewError::InvalidUrl` when the scheme or host is blank;
    /// a URL that cannot be formed fails the lookup and is never cached.
    pub fn display_url(&self) -> Result<String> {
        if self.scheme.trim().is_empty() {
            return Err(PreviewError::InvalidUrl("missing scheme".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(PreviewError::InvalidUrl("missing host".to_string()));
        }

        let path = if self.path_and_query.starts_with('/') || self.path_and_query.is_empty() {
            self.path_and_query.clone()
        } else {
            format!("/{}", self.path_and_query)
        };

        Ok(format!("{}://{}{}", self.scheme, self.host, path))
    }
}

/// A resolved description of how an incoming request maps to a content node,
/// built by the host's routing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedRequest {
    /// The display URL the request was routed for
    pub url: String,
    /// The content node the request is bound to
    pub content: ContentNode,
    /// Culture the route resolved to, if any
    pub culture: Option<String>,
}
