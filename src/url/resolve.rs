use url::Url;

/// Resolves a link attribute to an absolute http(s) URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only values
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - values that cannot be joined onto `base_url`
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use script_census::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// assert_eq!(
///     resolve_link("../js/app.js", &base),
///     Some("https://example.com/js/app.js".to_string())
/// );
/// assert_eq!(resolve_link("javascript:void(0)", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
