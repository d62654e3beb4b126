//! Crawl orchestration: a fixed pool of workers drains the frontier under
//! the page budget, depth cap, robots policy, and rate limits, building the
//! link graph and optionally saving minimal HTML per page.

use anyhow::{bail, Result};
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::CrawlConfig;
use crate::content::extract_minimal_html;
use crate::dedup::Deduplicator;
use crate::fetch::HttpFetcher;
use crate::frontier::Frontier;
use crate::graph::GraphStore;
use crate::limiter::RateLimiter;
use crate::links::extract_hrefs;
use crate::mime::is_html;
use crate::robots::RobotsPolicy;
use crate::types::UrlTask;
use crate::urls::{canonicalize, registrable_domain, url_to_content_path, CanonicalPolicy};

// Idle workers exit after observing an empty frontier for this long.
const DEQUEUE_POLL: Duration = Duration::from_secs(1);

pub struct Crawler {
    cfg: CrawlConfig,
    policy: CanonicalPolicy,
    seed_domains: Vec<String>,
    frontier: Frontier,
    dedup: Deduplicator,
    graph: GraphStore,
    limiter: RateLimiter,
    fetcher: HttpFetcher,
    robots: RobotsPolicy,
    processed: AtomicUsize,
    stop: AtomicBool,
}

impl Crawler {
    pub fn new(cfg: CrawlConfig) -> Result<Arc<Self>> {
        cfg.validate()?;
        let policy = cfg.canonical_policy();
        let seed_domains = cfg
            .seeds
            .iter()
            .filter_map(|s| registrable_domain(s))
            .collect();
        let fetcher = HttpFetcher::new(&cfg.user_agent, cfg.request_timeout, cfg.max_redirects)?;
        let robots = RobotsPolicy::new(&cfg.user_agent, cfg.robots_ttl);
        let limiter = RateLimiter::new(cfg.concurrency, cfg.per_host_rps);
        Ok(Arc::new(Self {
            policy,
            seed_domains,
            frontier: Frontier::new(),
            dedup: Deduplicator::exact(),
            graph: GraphStore::new(),
            limiter,
            fetcher,
            robots,
            processed: AtomicUsize::new(0),
            stop: AtomicBool::new(false),
            cfg,
        }))
    }

    /// Crawl from the configured seeds until the page budget is reached or
    /// the frontier drains.
    pub async fn run(self: &Arc<Self>) -> Result<()> {
        let mut seeded = 0;
        for seed in &self.cfg.seeds {
            match canonicalize(seed, None, &self.policy) {
                Some(url) => {
                    self.frontier.enqueue(UrlTask {
                        url,
                        depth: 0,
                        parent: None,
                    });
                    seeded += 1;
                }
                None => tracing::warn!(seed = %seed, "seed rejected by canonicalization"),
            }
        }
        if seeded == 0 {
            bail!("no seed survived canonicalization");
        }

        let workers: Vec<_> = (0..self.cfg.concurrency)
            .map(|id| {
                let crawler = Arc::clone(self);
                tokio::spawn(async move { crawler.worker(id).await })
            })
            .collect();
        for worker in workers {
            let _ = worker.await;
        }

        tracing::info!(
            processed = self.processed(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "crawl finished"
        );
        Ok(())
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Tasks fully processed. May exceed `max_pages` by up to
    /// `concurrency - 1` because in-flight tasks complete after the stop
    /// signal.
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    fn in_seed_domain(&self, url: &str) -> bool {
        match registrable_domain(url) {
            Some(domain) => self.seed_domains.iter().any(|d| *d == domain),
            None => false,
        }
    }

    async fn worker(&self, id: usize) {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return;
            }
            let task = match timeout(DEQUEUE_POLL, self.frontier.dequeue()).await {
                Ok(task) => task,
                Err(_) => return,
            };
            tracing::debug!(worker = id, url = %task.url, depth = task.depth, "dequeue");

            if self.dedup.seen(&task.url) {
                self.frontier.task_done();
                continue;
            }

            if !self.robots.is_allowed(&self.fetcher, &task.url).await {
                tracing::debug!(worker = id, url = %task.url, "robots deny");
                self.frontier.task_done();
                continue;
            }

            let res = {
                let _slot = self.limiter.slot(&task.url).await;
                self.fetcher.fetch(&task.url).await
            };
            let final_raw = if res.final_url.is_empty() {
                task.url.clone()
            } else {
                res.final_url.clone()
            };
            tracing::info!(
                worker = id,
                status = res.status,
                url = %task.url,
                final_url = %final_raw,
                "fetched"
            );

            // Dedup again on the canonical post-redirect URL: two tasks may
            // land on the same page through different entry URLs.
            let Some(final_url) = canonicalize(&final_raw, None, &self.policy) else {
                self.frontier.task_done();
                continue;
            };
            if self.dedup.seen(&final_url) {
                self.frontier.task_done();
                continue;
            }
            self.dedup.add(&final_url);

            if let Some(parent) = &task.parent {
                self.graph.add_edge(parent, &final_url);
            }

            if res.status < 400 && is_html(&res.content_type) && !res.text.is_empty() {
                if self.cfg.save_content {
                    self.save_content(&final_url, &res.text);
                }

                let children: Vec<String> = extract_hrefs(&res.text)
                    .iter()
                    .filter_map(|href| canonicalize(href, Some(&final_url), &self.policy))
                    .filter(|c| !self.cfg.same_domain_only || self.in_seed_domain(c))
                    .collect();

                if task.depth + 1 <= self.cfg.max_depth {
                    tracing::debug!(
                        worker = id,
                        count = children.len(),
                        from = %final_url,
                        depth = task.depth + 1,
                        "enqueue children"
                    );
                    for child in children {
                        if !self.dedup.seen(&child) {
                            self.frontier.enqueue(UrlTask {
                                url: child,
                                depth: task.depth + 1,
                                parent: Some(final_url.clone()),
                            });
                        }
                    }
                }
            }

            self.frontier.task_done();

            let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
            if processed == 1 || processed % 50 == 0 {
                tracing::info!(processed, queue = self.frontier.size(), "progress");
            }
            if processed >= self.cfg.max_pages {
                tracing::info!(max_pages = self.cfg.max_pages, "stop: page budget reached");
                self.stop.store(true, Ordering::Relaxed);
                return;
            }
        }
    }

    fn save_content(&self, url: &str, html: &str) {
        let minimal = extract_minimal_html(html, self.cfg.content_text_only);
        let out_path = url_to_content_path(url, &self.cfg.content_dir);
        let result = out_path
            .parent()
            .map(fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|()| fs::write(&out_path, minimal));
        if let Err(err) = result {
            tracing::debug!(url, error = %err, "content save failed");
        }
    }
}
