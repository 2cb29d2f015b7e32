//! Preview Context Service
//!
//! Memoizes the short-lived lookups a preview render repeats for the same
//! page: the routed request, the resolved culture, and the content node.
//! All three share one injected runtime cache with a common TTL.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::RuntimeCache;
use crate::error::Result;
use crate::host::{
    ContentContextAccessor, DomainCultureMapper, LocalizationService, RequestRouter,
};
use crate::models::{ContentNode, IncomingRequest, RoutedRequest};
use crate::preview::keys;

/// Sentinel the host's domain mapping yields when no culture is assigned.
///
/// Literal business rule from the host CMS: a resolved `"undefined"` is
/// substituted with the default language code.
pub const UNDEFINED_CULTURE: &str = "undefined";

/// TTL applied to all preview lookups unless overridden.
const DEFAULT_TTL: Duration = Duration::from_secs(30);

// == Preview Context Service ==
/// Memoized preview lookups over the host's collaborator capabilities.
pub struct PreviewContextService {
    context_accessor: Arc<dyn ContentContextAccessor>,
    localization: Arc<dyn LocalizationService>,
    domain_mapper: Arc<dyn DomainCultureMapper>,
    router: Arc<dyn RequestRouter>,
    cache: RuntimeCache,
    ttl: Duration,
}

impl PreviewContextService {
    // == Constructor ==
    /// Creates a new service over the given collaborators and cache.
    ///
    /// Lookups are memoized for 30 seconds; use [`Self::with_ttl`] to
    /// override, typically in tests.
    pub fn new(
        context_accessor: Arc<dyn ContentContextAccessor>,
        localization: Arc<dyn LocalizationService>,
        domain_mapper: Arc<dyn DomainCultureMapper>,
        router: Arc<dyn RequestRouter>,
        cache: RuntimeCache,
    ) -> Self {
        Self {
            context_accessor,
            localization,
            domain_mapper,
            router,
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    /// Overrides the memoization TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    // == Create Preview Request ==
    /// Builds (or returns the memoized) routed request binding `page` to the
    /// incoming request's display URL.
    ///
    /// # Errors
    /// An unresolvable display URL or a routing failure propagates to the
    /// caller and is not cached.
    pub async fn create_preview_request(
        &self,
        page: &ContentNode,
        request: &IncomingRequest,
    ) -> Result<RoutedRequest> {
        let key = keys::published_request_key(page.id);

        self.cache
            .get_or_compute_async(&key, self.ttl, || async move {
                let url = request.display_url()?;
                self.router.route(&url, page).await
            })
            .await
    }

    // == Resolve Culture ==
    /// Resolves the culture a preview of `page` should render in.
    ///
    /// A non-blank `requested` culture wins regardless of domain mapping. A
    /// blank one is derived from the domains above the node; the host's
    /// `"undefined"` sentinel is replaced with the default language code.
    /// Absence of any culture is itself memoized.
    pub fn resolve_culture(&self, page: &ContentNode, requested: &str) -> Result<Option<String>> {
        let key = keys::culture_key(page.id, requested);

        self.cache.get_or_compute(&key, self.ttl, || {
            let resolved = if requested.trim().is_empty() {
                self.domain_mapper.culture_from_domains(page)
            } else {
                Some(requested.to_string())
            };

            Ok(match resolved {
                Some(culture) if culture == UNDEFINED_CULTURE => {
                    Some(self.localization.default_language_code())
                }
                other => other,
            })
        })
    }

    // == Fetch Content Node ==
    /// Fetches the content node for `page_id`.
    ///
    /// The published (live) view is consulted first; an unpublished node is
    /// fetched from the draft view instead. Without an active rendering
    /// context, or when the id exists in neither view, the result is `None`
    /// (and that absence is memoized).
    pub fn fetch_content_node(&self, page_id: i32) -> Result<Option<ContentNode>> {
        let key = keys::published_content_key(page_id);

        self.cache.get_or_compute(&key, self.ttl, || {
            let Some(context) = self.context_accessor.context() else {
                return Ok(None);
            };

            Ok(context
                .content_by_id(page_id, false)
                .or_else(|| context.content_by_id(page_id, true)))
        })
    }

    /// Statistics of the underlying cache.
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for PreviewContextService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewContextService")
            .field("ttl", &self.ttl)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
