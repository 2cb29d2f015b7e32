//! Host Module
//!
//! Capability traits for the CMS collaborators this crate depends on. All of
//! them are supplied at construction time and treated as opaque: content
//! lookup, localization, domain-to-culture mapping, and request routing live
//! in the host, not here.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ContentNode, RoutedRequest};

/// A rendering context's view of the content repository.
pub trait ContentContext: Send + Sync {
    /// Looks up a node by id.
    ///
    /// With `preview == false` the published (live) view is consulted; with
    /// `preview == true` the draft view, which also contains not-yet-published
    /// nodes.
    fn content_by_id(&self, id: i32, preview: bool) -> Option<ContentNode>;
}

/// Accessor for the rendering context of the current request.
///
/// Returns `None` when no rendering context is active, for example outside a
/// preview render.
pub trait ContentContextAccessor: Send + Sync {
    fn context(&self) -> Option<Arc<dyn ContentContext>>;
}

/// Provides the host's localization defaults.
pub trait LocalizationService: Send + Sync {
    /// ISO code of the default language, e.g. "en-US".
    fn default_language_code(&self) -> String;
}

/// Maps a content node to a culture via the host's domain configuration.
pub trait DomainCultureMapper: Send + Sync {
    /// Culture derived from the domains assigned above the node, if any.
    ///
    /// The host may yield the literal sentinel `"undefined"` when no culture
    /// is assigned; callers substitute the default language for it.
    fn culture_from_domains(&self, content: &ContentNode) -> Option<String>;
}

/// Builds routed requests through the host's routing pipeline.
#[async_trait]
pub trait RequestRouter: Send + Sync {
    /// Routes `display_url` and binds the result to `content`.
    ///
    /// # Errors
    /// Returns `PreviewError::Routing` when the pipeline cannot construct a
    /// request; the failure propagates to the caller uncached.
    async fn route(&self, display_url: &str, content: &ContentNode) -> Result<RoutedRequest>;
}
