//! URL helpers for the translate endpoint family
//!
//! Config files and environment overrides arrive with stray slashes in both
//! directions; all request URLs are built through here so the joined form
//! never carries doubled or missing separators.

/// Strip trailing slashes from a configured base URL.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path into a request URL.
pub fn join_endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_any_number_of_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://example.com/v1"),
            "https://example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://example.com/v1/"),
            "https://example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://example.com/v1///"),
            "https://example.com/v1"
        );
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn join_handles_slashes_on_either_side() {
        let expected = "https://example.com/api/translator/translate";
        assert_eq!(
            join_endpoint("https://example.com", "api/translator/translate"),
            expected
        );
        assert_eq!(
            join_endpoint("https://example.com/", "api/translator/translate"),
            expected
        );
        assert_eq!(
            join_endpoint("https://example.com", "/api/translator/translate"),
            expected
        );
        assert_eq!(
            join_endpoint("https://example.com///", "//api/translator/translate"),
            expected
        );
    }
}
