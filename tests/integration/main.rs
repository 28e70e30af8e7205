//! Integration tests for Script-Census
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! crawls through the real HTTP fetcher and HTML extractors.

mod crawl_tests;
