use anyhow::{bail, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::patterns;
use crate::urls::CanonicalPolicy;

/// Immutable configuration for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed URLs; at least one must survive canonicalization.
    pub seeds: Vec<String>,

    // Traversal budgets
    pub max_depth: usize,
    pub max_pages: usize,
    pub same_domain_only: bool,

    // Concurrency and pacing
    pub concurrency: usize,
    pub per_host_rps: f64,

    // Network
    pub user_agent: String,
    pub request_timeout: Duration,
    pub max_redirects: usize,

    // URL filters
    pub allowed_schemes: HashSet<String>,
    pub blocked_extensions: HashSet<String>,
    pub tracking_params: HashSet<String>,
    pub tracking_prefixes: Vec<String>,
    pub strip_trailing_slash: bool,

    // robots.txt
    pub robots_ttl: Duration,

    // Content saving
    pub save_content: bool,
    pub content_dir: PathBuf,
    pub content_text_only: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            max_depth: 2,
            max_pages: 10_000,
            same_domain_only: true,
            concurrency: 10,
            per_host_rps: 2.0,
            user_agent: "WebParser/0.1 (+https://example.com; contact: bot@example.com)"
                .to_string(),
            request_timeout: Duration::from_secs(15),
            max_redirects: 5,
            allowed_schemes: ["http", "https"].iter().map(|s| s.to_string()).collect(),
            blocked_extensions: patterns::BLOCK_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tracking_params: patterns::TRACKING_PARAMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tracking_prefixes: patterns::TRACKING_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strip_trailing_slash: true,
            robots_ttl: Duration::from_secs(600),
            save_content: false,
            content_dir: PathBuf::from("content"),
            content_text_only: false,
        }
    }
}

impl CrawlConfig {
    /// Reject configurations that cannot produce a meaningful crawl. Called
    /// before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.seeds.is_empty() {
            bail!("at least one seed URL is required");
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.per_host_rps <= 0.0 {
            bail!("per-host rate must be positive, got {}", self.per_host_rps);
        }
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        Ok(())
    }

    /// URL canonicalization policy derived from the filter fields.
    pub fn canonical_policy(&self) -> CanonicalPolicy {
        CanonicalPolicy {
            allowed_schemes: self.allowed_schemes.clone(),
            tracking_params: self.tracking_params.clone(),
            tracking_prefixes: self.tracking_prefixes.clone(),
            blocked_extensions: self.blocked_extensions.clone(),
            strip_trailing_slash: self.strip_trailing_slash,
        }
    }
}
