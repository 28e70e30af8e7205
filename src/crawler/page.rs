//! Page data flowing between pipeline stages

use std::ops::Deref;
use std::sync::Arc;

/// A downloaded page, ready to be handed to an extractor
///
/// The pipeline never looks inside a `FetchedPage`; it only moves it from the
/// fetch stage to exactly one extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Location of the page after redirects; relative links resolve against it
    pub url: String,

    /// Page body content
    pub body: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// An immutable, ordered list of URLs discovered on one page
///
/// Used both for the result links of a search page and for the script
/// references of a result page. Order is extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePage {
    urls: Arc<[String]>,
}

impl ResourcePage {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls: urls.into() }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl Deref for ResourcePage {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.urls
    }
}

impl From<Vec<String>> for ResourcePage {
    fn from(urls: Vec<String>) -> Self {
        Self::new(urls)
    }
}

impl FromIterator<String> for ResourcePage {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
