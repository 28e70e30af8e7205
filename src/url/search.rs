use crate::config::SearchConfig;
use crate::ConfigError;
use url::Url;

/// Path used by search engines to wrap outbound result links
const REDIRECT_PATH: &str = "/url";

/// Query parameters a redirect wrapper may carry its target in
const REDIRECT_TARGET_PARAMS: &[&str] = &["q", "url"];

/// Builds the seed URL for a query
///
/// The query is appended to the configured base URL as the configured query
/// parameter, percent-encoded as `application/x-www-form-urlencoded`. Existing
/// parameters on the base URL are preserved.
///
/// # Examples
///
/// ```
/// use script_census::config::SearchConfig;
/// use script_census::url::build_search_url;
///
/// let search = SearchConfig {
///     base_url: "https://search.example.com/find?lang=en".to_string(),
///     ..SearchConfig::default()
/// };
/// let url = build_search_url(&search, "rust & tokio").unwrap();
/// assert_eq!(url, "https://search.example.com/find?lang=en&q=rust+%26+tokio");
/// ```
pub fn build_search_url(config: &SearchConfig, query: &str) -> Result<String, ConfigError> {
    let mut url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    url.query_pairs_mut()
        .append_pair(&config.query_param, query.trim());

    Ok(url.to_string())
}

/// Replaces a search-engine redirect wrapper (`/url?q=<target>`) by its target
///
/// Links that are not redirect wrappers, or whose target is not an absolute
/// http(s) URL, are returned unchanged.
pub fn unwrap_redirect(link: &str) -> String {
    let Ok(url) = Url::parse(link) else {
        return link.to_string();
    };

    if url.path() != REDIRECT_PATH {
        return link.to_string();
    }

    url.query_pairs()
        .find(|(key, _)| REDIRECT_TARGET_PARAMS.contains(&key.as_ref()))
        .and_then(|(_, target)| Url::parse(&target).ok())
        .filter(|target| target.scheme() == "http" || target.scheme() == "https")
        .map(|target| target.to_string())
        .unwrap_or_else(|| link.to_string())
}
