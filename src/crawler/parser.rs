//! HTML extractors for result links and script references
//!
//! Both extractors share the same shape: select elements with a CSS
//! selector, read one attribute, and resolve it against the page location.
//! - `SearchResultExtractor` reads `href` from result anchors on the search page
//! - `ScriptExtractor` reads `src` from `<script>` elements on result pages

use crate::config::SearchConfig;
use crate::crawler::page::{FetchedPage, ResourcePage};
use crate::url::{resolve_link, unwrap_redirect};
use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Turns a fetched page into the list of URLs it references
///
/// Extraction is expected to be deterministic; an error means the extractor
/// or the page is unusable and is treated as fatal by the pipeline.
pub trait LinkExtractor: Send + Sync + 'static {
    fn extract(&self, page: &FetchedPage) -> Result<ResourcePage, ParseError>;
}

/// Extracts result links from a search results page
#[derive(Debug, Clone)]
pub struct SearchResultExtractor {
    selector: String,
    unwrap_redirects: bool,
}

impl SearchResultExtractor {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            unwrap_redirects: true,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            selector: config.result_selector.clone(),
            unwrap_redirects: config.unwrap_redirects,
        }
    }

    /// Keeps `/url?q=` redirect wrappers as they appear on the page
    pub fn keep_redirects(mut self) -> Self {
        self.unwrap_redirects = false;
        self
    }
}

impl Default for SearchResultExtractor {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl LinkExtractor for SearchResultExtractor {
    fn extract(&self, page: &FetchedPage) -> Result<ResourcePage, ParseError> {
        tracing::info!("Parse: {}", page.url);

        let links = select_attribute(page, &self.selector, "href")?;

        if !self.unwrap_redirects {
            return Ok(ResourcePage::new(links));
        }

        Ok(links.iter().map(|link| unwrap_redirect(link)).collect())
    }
}

/// Extracts script resource URLs from a page
#[derive(Debug, Clone)]
pub struct ScriptExtractor {
    selector: String,
}

impl ScriptExtractor {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.script_selector.clone())
    }
}

impl Default for ScriptExtractor {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl LinkExtractor for ScriptExtractor {
    fn extract(&self, page: &FetchedPage) -> Result<ResourcePage, ParseError> {
        tracing::info!("Parse: {}", page.url);

        select_attribute(page, &self.selector, "src").map(ResourcePage::new)
    }
}

/// Selects `selector` in the page body and resolves `attribute` of every match
///
/// Matches whose attribute is missing or does not resolve to an http(s) URL
/// are skipped. Repeated values are kept in document order.
fn select_attribute(
    page: &FetchedPage,
    selector: &str,
    attribute: &str,
) -> Result<Vec<String>, ParseError> {
    let selector = Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })?;

    let base_url = Url::parse(&page.url).map_err(|source| ParseError::InvalidBaseUrl {
        url: page.url.clone(),
        source,
    })?;

    let document = Html::parse_document(&page.body);

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(value) = element.value().attr(attribute) else {
            continue;
        };

        match resolve_link(value, &base_url) {
            Some(absolute_url) => links.push(absolute_url),
            None => tracing::trace!(
                "Skipping unresolvable {}=\"{}\" on {}",
                attribute,
                value,
                page.url
            ),
        }
    }

    Ok(links)
}
