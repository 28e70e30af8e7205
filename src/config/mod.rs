//! Configuration module for Script-Census
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; a missing file section falls back to the built-in
//! defaults, so `Config::default()` is a complete, valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use script_census::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("census.toml")).unwrap();
//! println!("Results per crawl: {}", config.output.limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, OutputConfig, PoolConfig, SearchConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
pub use validation::validate;
