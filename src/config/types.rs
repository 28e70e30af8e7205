use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Script-Census
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub fetcher: FetcherConfig,
    pub pool: PoolConfig,
    pub output: OutputConfig,
}

/// Search engine endpoint and markup bindings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search endpoint; the query is appended as `query_param`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Name of the query-string parameter carrying the search terms
    #[serde(rename = "query-param")]
    pub query_param: String,

    /// CSS selector for result links on the search results page
    #[serde(rename = "result-selector")]
    pub result_selector: String,

    /// CSS selector for script references on result pages
    #[serde(rename = "script-selector")]
    pub script_selector: String,

    /// Whether `/url?q=<target>` redirect wrappers are replaced by their target
    #[serde(rename = "unwrap-redirects")]
    pub unwrap_redirects: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.google.com/search?ie=utf-8&oe=utf-8".to_string(),
            query_param: "q".to_string(),
            result_selector: "div.kCrYT > a[href]".to_string(),
            script_selector: "script[src]".to_string(),
            unwrap_redirects: true,
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Connection establishment timeout (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla".to_string(),
            timeout_ms: 2000,
            connect_timeout_ms: 2000,
        }
    }
}

/// Worker pool sizing and lifecycle
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Threads in the I/O pool (0 = twice the available parallelism)
    #[serde(rename = "io-threads")]
    pub io_threads: usize,

    /// Threads in the compute pool (0 = available parallelism)
    #[serde(rename = "compute-threads")]
    pub compute_threads: usize,

    /// How long shutdown waits for in-flight tasks (milliseconds)
    #[serde(rename = "shutdown-grace-ms")]
    pub shutdown_grace_ms: u64,
}

impl PoolConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            io_threads: 0,
            compute_threads: 0,
            shutdown_grace_ms: 1000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Number of ranked libraries reported when the CLI is not told otherwise
    pub limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { limit: 5 }
    }
}
