//! Crawler module for page fetching and script census
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and error classification
//! - HTML extraction of result links and script references
//! - The I/O and compute worker pools
//! - Stage orchestration, aggregation and ranking

mod fetcher;
mod page;
mod parser;
mod pipeline;
mod pool;
mod ranking;

pub use fetcher::{build_http_client, fetch_url, HttpFetcher, PageFetcher};
pub use page::{FetchedPage, ResourcePage};
pub use parser::{LinkExtractor, ScriptExtractor, SearchResultExtractor};
pub use pipeline::{CrawlOutcome, CrawlPipeline, CrawlReport};
pub use pool::{available_parallelism, WorkerPool, COMPUTE_POOL, IO_POOL};
pub use ranking::{rank, rerank, AggregateCount, RankedEntry};

use crate::config::Config;

/// The pipeline wired with the HTTP fetcher and the configured extractors
pub type HttpCrawlPipeline = CrawlPipeline<HttpFetcher, SearchResultExtractor, ScriptExtractor>;

/// Builds a pipeline from configuration
///
/// # Arguments
///
/// * `config` - The census configuration
///
/// # Returns
///
/// * `Ok(HttpCrawlPipeline)` - Pools started and HTTP client built
/// * `Err(CensusError)` - The HTTP client or a pool could not be created
pub fn build_pipeline(config: &Config) -> crate::Result<HttpCrawlPipeline> {
    CrawlPipeline::new(
        HttpFetcher::new(&config.fetcher)?,
        SearchResultExtractor::from_config(&config.search),
        ScriptExtractor::from_config(&config.search),
        &config.pool,
    )
}
