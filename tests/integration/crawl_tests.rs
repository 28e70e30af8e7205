//! End-to-end crawls against wiremock servers

use script_census::config::Config;
use script_census::crawler::{build_pipeline, HttpCrawlPipeline, RankedEntry};
use script_census::url::build_search_url;
use script_census::{
    CensusError, CrawlPipeline, HttpFetcher, ScriptExtractor, SearchResultExtractor,
};
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts a mock server; the returned runtime must outlive the test
///
/// Crawls block the calling thread, so tests drive wiremock from their own
/// runtime and call the pipeline from the plain test thread.
fn start_server() -> (Runtime, MockServer) {
    let runtime = Runtime::new().expect("Failed to build test runtime");
    let server = runtime.block_on(MockServer::start());
    (runtime, server)
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn search_page(links: &[String]) -> String {
    let results: String = links
        .iter()
        .map(|link| format!(r#"<div class="kCrYT"><a href="{}">Result</a></div>"#, link))
        .collect();
    format!(
        r#"<html><head><title>Search</title></head><body>
        <div class="header"><a href="/preferences">Settings</a></div>
        {}
        </body></html>"#,
        results
    )
}

fn script_page(scripts: &[&str]) -> String {
    let tags: String = scripts
        .iter()
        .map(|src| format!(r#"<script src="{}"></script>"#, src))
        .collect();
    format!(
        "<html><head><title>Page</title>{}</head><body><script>inline()</script></body></html>",
        tags
    )
}

/// Creates a test configuration pointed at the mock server's search endpoint
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.search.base_url = format!("{}/search", base_url);
    config.fetcher.timeout_ms = 500;
    config.fetcher.connect_timeout_ms = 500;
    config.pool.io_threads = 4;
    config.pool.compute_threads = 2;
    config.pool.shutdown_grace_ms = 200;
    config
}

/// Runs one crawl and returns how often the consumer ran and what it received
fn crawl(pipeline: &HttpCrawlPipeline, url: &str, limit: usize) -> (usize, Vec<RankedEntry>) {
    let mut calls = 0;
    let mut delivered = Vec::new();
    pipeline.crawl(url, limit, |ranking| {
        calls += 1;
        delivered = ranking;
    });
    (calls, delivered)
}

fn pairs(entries: &[RankedEntry]) -> Vec<(String, u64)> {
    entries
        .iter()
        .map(|e| (e.library.clone(), e.occurrences))
        .collect()
}

#[test]
fn test_full_crawl_ranks_libraries() {
    let (runtime, server) = start_server();
    let base_url = server.uri();

    let links: Vec<String> = (1..=3).map(|n| format!("{}/page{}", base_url, n)).collect();

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "jquery plugins"))
            .respond_with(html(search_page(&links)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page1"))
            .respond_with(html(script_page(&[
                "https://cdn.example.com/jquery.min.js",
                "/js/site1.js",
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(html(script_page(&[
                "https://cdn.example.com/jquery.min.js",
                "https://cdn.example.com/react.js",
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page3"))
            .respond_with(html(script_page(&[
                "https://cdn.example.com/react.js",
                "https://cdn.example.com/jquery.min.js",
            ])))
            .mount(&server)
            .await;
    });

    let config = create_test_config(&base_url);
    let url = build_search_url(&config.search, "jquery plugins").expect("Failed to build URL");
    let pipeline = build_pipeline(&config).expect("Failed to create pipeline");

    let (calls, ranking) = crawl(&pipeline, &url, 5);

    assert_eq!(calls, 1);
    assert_eq!(
        pairs(&ranking),
        [
            ("https://cdn.example.com/jquery.min.js".to_string(), 3),
            ("https://cdn.example.com/react.js".to_string(), 2),
            (format!("{}/js/site1.js", base_url), 1),
        ]
    );

    pipeline.stop();
}

#[test]
fn test_five_results_one_library_each() {
    let (runtime, server) = start_server();
    let base_url = server.uri();

    let links: Vec<String> = (1..=5)
        .map(|n| format!("{}/some-uri-{}", base_url, n))
        .collect();

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(html(search_page(&links)))
            .mount(&server)
            .await;

        for n in 1..=5 {
            let script = format!("/some-uri-{}/jquery{}.js", n, n);
            Mock::given(method("GET"))
                .and(path(format!("/some-uri-{}", n)))
                .respond_with(html(script_page(&[script.as_str()])))
                .mount(&server)
                .await;
        }
    });

    let config = create_test_config(&base_url);
    let url = build_search_url(&config.search, "jquery").expect("Failed to build URL");
    let pipeline = build_pipeline(&config).expect("Failed to create pipeline");

    let (calls, ranking) = crawl(&pipeline, &url, 5);

    assert_eq!(calls, 1);
    let expected: Vec<(String, u64)> = (1..=5)
        .map(|n| (format!("{}/some-uri-{}/jquery{}.js", base_url, n, n), 1))
        .collect();
    assert_eq!(pairs(&ranking), expected);

    pipeline.stop();
}

#[test]
fn test_search_engine_does_not_respond() {
    let (runtime, server) = start_server();
    let base_url = server.uri();

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
    });

    let config = create_test_config(&base_url);
    let url = build_search_url(&config.search, "jquery").expect("Failed to build URL");
    let pipeline = build_pipeline(&config).expect("Failed to create pipeline");

    let (calls, ranking) = crawl(&pipeline, &url, 5);

    assert_eq!(calls, 1);
    assert!(ranking.is_empty());

    match pipeline.try_crawl(&url, 5) {
        Err(CensusError::Fetch(e)) => assert_eq!(e.url(), url),
        other => panic!("Expected a fetch error, got {:?}", other),
    }

    pipeline.stop();
}

#[test]
fn test_one_of_the_pages_does_not_respond() {
    let (runtime, server) = start_server();
    let base_url = server.uri();

    let links: Vec<String> = ["/ok-1", "/broken", "/ok-2"]
        .iter()
        .map(|p| format!("{}{}", base_url, p))
        .collect();

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(html(search_page(&links)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/ok-1"))
            .respond_with(html(script_page(&["https://cdn.example.com/lodash.js"])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/ok-2"))
            .respond_with(html(script_page(&["https://cdn.example.com/lodash.js"])))
            .mount(&server)
            .await;
    });

    let config = create_test_config(&base_url);
    let url = build_search_url(&config.search, "lodash").expect("Failed to build URL");
    let pipeline = build_pipeline(&config).expect("Failed to create pipeline");

    let outcome = pipeline.try_crawl(&url, 5).expect("Crawl failed");

    assert_eq!(
        pairs(&outcome.ranking),
        [("https://cdn.example.com/lodash.js".to_string(), 2)]
    );
    assert_eq!(outcome.report.links_found, 3);
    assert_eq!(outcome.report.pages_fetched, 2);
    assert_eq!(outcome.report.fetch_failures, 1);

    pipeline.stop();
}

#[test]
fn test_slow_page_times_out_without_failing_crawl() {
    let (runtime, server) = start_server();
    let base_url = server.uri();

    let links = vec![format!("{}/fast", base_url), format!("{}/slow", base_url)];

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(html(search_page(&links)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/fast"))
            .respond_with(html(script_page(&["/fast.js"])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                html(script_page(&["/slow.js"])).set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
    });

    let config = create_test_config(&base_url);
    let url = build_search_url(&config.search, "timeouts").expect("Failed to build URL");
    let pipeline = build_pipeline(&config).expect("Failed to create pipeline");

    let outcome = pipeline.try_crawl(&url, 5).expect("Crawl failed");

    assert_eq!(
        pairs(&outcome.ranking),
        [(format!("{}/fast.js", base_url), 1)]
    );
    assert_eq!(outcome.report.fetch_failures, 1);

    pipeline.stop();
}

#[test]
fn test_redirect_wrapped_results_are_followed() {
    let (runtime, server) = start_server();
    let base_url = server.uri();

    let wrapped = vec![format!("/url?q={}/target&amp;sa=U", base_url)];

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(html(search_page(&wrapped)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/target"))
            .respond_with(html(script_page(&["https://cdn.example.com/vue.js"])))
            .mount(&server)
            .await;
    });

    let config = create_test_config(&base_url);
    let url = build_search_url(&config.search, "vue").expect("Failed to build URL");
    let pipeline = build_pipeline(&config).expect("Failed to create pipeline");

    let (_, ranking) = crawl(&pipeline, &url, 5);

    assert_eq!(
        pairs(&ranking),
        [("https://cdn.example.com/vue.js".to_string(), 1)]
    );

    pipeline.stop();
}

#[test]
fn test_crawl_after_stop_is_empty() {
    let (_runtime, server) = start_server();
    let config = create_test_config(&server.uri());
    let url = build_search_url(&config.search, "anything").expect("Failed to build URL");
    let pipeline = build_pipeline(&config).expect("Failed to create pipeline");

    pipeline.stop();
    let (calls, ranking) = crawl(&pipeline, &url, 5);

    assert_eq!(calls, 1);
    assert!(ranking.is_empty());
}

#[test]
fn test_crawl_with_caller_supplied_client() {
    let (runtime, server) = start_server();
    let base_url = server.uri();

    let links = vec![format!("{}/agent", base_url)];

    runtime.block_on(async {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("user-agent", "census-bot/1.0"))
            .respond_with(html(search_page(&links)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/agent"))
            .and(header("user-agent", "census-bot/1.0"))
            .respond_with(html(script_page(&["https://cdn.example.com/d3.js"])))
            .mount(&server)
            .await;
    });

    let config = create_test_config(&base_url);
    let client = reqwest::Client::builder()
        .user_agent("census-bot/1.0")
        .timeout(Duration::from_millis(500))
        .build()
        .expect("Failed to build client");

    let pipeline = CrawlPipeline::new(
        HttpFetcher::with_client(client),
        SearchResultExtractor::from_config(&config.search),
        ScriptExtractor::from_config(&config.search),
        &config.pool,
    )
    .expect("Failed to create pipeline");

    let url = build_search_url(&config.search, "charts").expect("Failed to build URL");
    let (calls, ranking) = crawl(&pipeline, &url, 5);

    assert_eq!(calls, 1);
    assert_eq!(
        pairs(&ranking),
        [("https://cdn.example.com/d3.js".to_string(), 1)]
    );

    pipeline.stop();
}
