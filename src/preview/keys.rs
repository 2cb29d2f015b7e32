//! Cache key construction for the preview lookups.
//!
//! The key templates are carried over verbatim from the host plugin; entries
//! written under them are shared with anything else reading the same cache.

/// Key for the memoized routed request of a page.
pub(crate) fn published_request_key(page_id: i32) -> String {
    format!("Preview_PublishedRequest_{}", page_id)
}

/// Key for the memoized culture resolution of a page and requested culture.
pub(crate) fn culture_key(page_id: i32, culture: &str) -> String {
    format!("Preview_Culture_{}_{}", page_id, culture)
}

/// Key for the memoized content fetch of a page.
pub(crate) fn published_content_key(page_id: i32) -> String {
    format!("Preview_PublishedContent_{}", page_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_request_key() {
        assert_eq!(published_request_key(1234), "Preview_PublishedRequest_1234");
    }

    #[test]
    fn test_culture_key() {
        assert_eq!(culture_key(1234, "da-DK"), "Preview_Culture_1234_da-DK");
    }

    #[test]
    fn test_culture_key_blank_culture() {
        // A blank requested culture still yields a distinct, valid key
        assert_eq!(culture_key(1234, ""), "Preview_Culture_1234_");
    }

    #[test]
    fn test_published_content_key() {
        assert_eq!(published_content_key(1234), "Preview_PublishedContent_1234");
    }
}
