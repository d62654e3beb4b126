//! Core of the WebParser toolkit: URL canonicalization, polite concurrent
//! crawling with robots.txt and per-host pacing, link-graph construction,
//! and site-bundle assembly.

pub mod bundle;
pub mod config;
pub mod content;
pub mod crawl;
pub mod dedup;
pub mod export;
pub mod fetch;
pub mod frontier;
pub mod graph;
pub mod limiter;
pub mod links;
pub mod logging;
pub mod mime;
pub mod patterns;
pub mod robots;
pub mod types;
pub mod urls;

pub use config::CrawlConfig;
pub use crawl::Crawler;
pub use types::{FetchResult, UrlTask};
