//! Crawl pipeline - stage orchestration across the I/O and compute pools
//!
//! A crawl runs these stages, each one finishing completely before the next
//! starts:
//! 1. Fetch the seed (search results) page on the I/O pool
//! 2. Extract result links from it on the compute pool
//! 3. Fetch every result link concurrently on the I/O pool
//! 4. Extract script references from every fetched page on the compute pool
//! 5. Fold all references into one `AggregateCount` (single writer)
//! 6. Rank the top N libraries
//!
//! A failed result-link fetch only removes that page from the crawl. A failed
//! seed fetch, a failed extraction or a failed task ends the crawl with an
//! empty ranking.

use crate::config::PoolConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::page::{FetchedPage, ResourcePage};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::pool::WorkerPool;
use crate::crawler::ranking::{rank, AggregateCount, RankedEntry};
use crate::CensusError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinHandle};

/// Counters describing one finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Result links found on the seed page
    pub links_found: usize,

    /// Result pages downloaded successfully
    pub pages_fetched: usize,

    /// Result pages that could not be downloaded
    pub fetch_failures: usize,

    /// Distinct libraries referenced across all fetched pages
    pub distinct_libraries: usize,

    /// Total script references across all fetched pages
    pub total_references: u64,
}

/// Ranking and counters produced by a successful crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub ranking: Vec<RankedEntry>,
    pub report: CrawlReport,
}

/// Drives fetch and extraction work for a crawl over two worker pools
///
/// The pipeline can run any number of crawls until [`CrawlPipeline::stop`]
/// is called. Crawls after that deliver an empty ranking.
pub struct CrawlPipeline<F, R, S> {
    fetcher: Arc<F>,
    result_extractor: Arc<R>,
    script_extractor: Arc<S>,
    io: WorkerPool,
    compute: WorkerPool,
    shutdown_grace: Duration,
}

impl<F, R, S> CrawlPipeline<F, R, S>
where
    F: PageFetcher,
    R: LinkExtractor,
    S: LinkExtractor,
{
    /// Creates a pipeline with pools sized from `pool`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use script_census::config::Config;
    /// use script_census::{CrawlPipeline, HttpFetcher, ScriptExtractor, SearchResultExtractor};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config::default();
    /// let pipeline = CrawlPipeline::new(
    ///     HttpFetcher::new(&config.fetcher)?,
    ///     SearchResultExtractor::from_config(&config.search),
    ///     ScriptExtractor::from_config(&config.search),
    ///     &config.pool,
    /// )?;
    ///
    /// pipeline.crawl("http://www.google.com/search?q=jquery", 5, |ranking| {
    ///     for entry in ranking {
    ///         println!("{}", entry);
    ///     }
    /// });
    /// pipeline.stop();
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        fetcher: F,
        result_extractor: R,
        script_extractor: S,
        pool: &PoolConfig,
    ) -> Result<Self, CensusError> {
        let io = WorkerPool::io(pool.io_threads)?;
        let compute = WorkerPool::compute(pool.compute_threads)?;

        Ok(Self::with_pools(
            fetcher,
            result_extractor,
            script_extractor,
            io,
            compute,
            pool.shutdown_grace(),
        ))
    }

    /// Creates a pipeline over pools supplied by the caller
    pub fn with_pools(
        fetcher: F,
        result_extractor: R,
        script_extractor: S,
        io: WorkerPool,
        compute: WorkerPool,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            result_extractor: Arc::new(result_extractor),
            script_extractor: Arc::new(script_extractor),
            io,
            compute,
            shutdown_grace,
        }
    }

    /// Crawls from `seed_url` and hands the top `limit` libraries to `consumer`
    ///
    /// Blocks until the crawl is complete. `consumer` is called exactly once,
    /// with an empty ranking if the crawl failed; no error reaches the caller.
    /// Must not be called from within an async context.
    pub fn crawl<C>(&self, seed_url: &str, limit: usize, consumer: C)
    where
        C: FnOnce(Vec<RankedEntry>),
    {
        let ranking = match self.try_crawl(seed_url, limit) {
            Ok(outcome) => outcome.ranking,
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", seed_url, e);
                Vec::new()
            }
        };

        consumer(ranking);
    }

    /// Crawls from `seed_url`, returning the ranking or the error that ended the crawl
    ///
    /// Must not be called from within an async context.
    pub fn try_crawl(&self, seed_url: &str, limit: usize) -> Result<CrawlOutcome, CensusError> {
        let handle = self.io.handle()?;
        handle.block_on(self.run(seed_url, limit))
    }

    /// Shuts both pools down, waiting up to the configured grace period for each
    ///
    /// Must not be called from within an async context.
    pub fn stop(&self) {
        self.io.shutdown(self.shutdown_grace);
        self.compute.shutdown(self.shutdown_grace);
    }

    pub fn is_stopped(&self) -> bool {
        self.io.is_shutdown() || self.compute.is_shutdown()
    }

    async fn run(&self, seed_url: &str, limit: usize) -> Result<CrawlOutcome, CensusError> {
        let start_time = Instant::now();
        tracing::info!("Starting crawl from {}", seed_url);

        let seed_page = self.fetch_seed(seed_url).await?;

        let result_extractor = Arc::clone(&self.result_extractor);
        let links = self
            .compute
            .submit_blocking(move || result_extractor.extract(&seed_page))?
            .await
            .map_err(task_failed("extract-results"))??;

        let pages = self.fetch_all(&links).await?;
        let pages_fetched = pages.iter().flatten().count();

        let scripts = self.extract_all(pages).await?;

        let (counts, ranking) = self
            .compute
            .submit_blocking(move || {
                let counts = AggregateCount::from_pages(&scripts);
                let ranking = rank(&counts, limit);
                (counts, ranking)
            })?
            .await
            .map_err(task_failed("aggregate"))?;

        let report = CrawlReport {
            links_found: links.len(),
            pages_fetched,
            fetch_failures: links.len() - pages_fetched,
            distinct_libraries: counts.len(),
            total_references: counts.total(),
        };

        tracing::info!(
            "Crawl completed in {:?}: {} links, {} pages fetched, {} failed, {} distinct libraries",
            start_time.elapsed(),
            report.links_found,
            report.pages_fetched,
            report.fetch_failures,
            report.distinct_libraries
        );

        Ok(CrawlOutcome { ranking, report })
    }

    async fn fetch_seed(&self, seed_url: &str) -> Result<FetchedPage, CensusError> {
        let fetcher = Arc::clone(&self.fetcher);
        let url = seed_url.to_string();

        let page = self
            .io
            .submit(async move { fetcher.fetch(&url).await })?
            .await
            .map_err(task_failed("fetch-seed"))??;

        Ok(page)
    }

    /// Fetches every link, one task per link, and waits for all of them
    ///
    /// The result has one entry per link, in link order; `None` marks a page
    /// that could not be fetched.
    async fn fetch_all(&self, links: &ResourcePage) -> Result<Vec<Option<FetchedPage>>, CensusError> {
        let mut tasks = Vec::with_capacity(links.len());
        for link in links.iter() {
            let fetcher = Arc::clone(&self.fetcher);
            let url = link.clone();
            let task = self.io.submit(async move { fetcher.fetch(&url).await })?;
            tasks.push((link.as_str(), task));
        }

        let mut pages = Vec::with_capacity(tasks.len());
        for (link, task) in tasks {
            let page = match task.await {
                Ok(Ok(page)) => Some(page),
                Ok(Err(e)) => {
                    tracing::warn!("Error: {}", e);
                    None
                }
                Err(e) => {
                    tracing::warn!("Fetch task for {} did not complete: {}", link, e);
                    None
                }
            };
            pages.push(page);
        }

        Ok(pages)
    }

    /// Extracts script references from every fetched page and waits for all of them
    ///
    /// All extractions settle before the first failure, if any, is returned.
    async fn extract_all(
        &self,
        pages: Vec<Option<FetchedPage>>,
    ) -> Result<Vec<ResourcePage>, CensusError> {
        let mut tasks: Vec<JoinHandle<_>> = Vec::with_capacity(pages.len());
        for page in pages.into_iter().flatten() {
            let extractor = Arc::clone(&self.script_extractor);
            tasks.push(self.compute.submit_blocking(move || extractor.extract(&page))?);
        }

        let mut settled = Vec::with_capacity(tasks.len());
        for task in tasks {
            settled.push(task.await);
        }

        settled
            .into_iter()
            .map(|joined| -> Result<ResourcePage, CensusError> {
                Ok(joined.map_err(task_failed("extract-scripts"))??)
            })
            .collect()
    }
}

impl<F, R, S> std::fmt::Debug for CrawlPipeline<F, R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlPipeline")
            .field("io", &self.io)
            .field("compute", &self.compute)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}

fn task_failed(stage: &'static str) -> impl Fn(JoinError) -> CensusError {
    move |e| CensusError::TaskFailed {
        stage,
        message: e.to_string(),
    }
}
