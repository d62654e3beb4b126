use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use texting_robots::Robot;
use url::Url;

use crate::fetch::HttpFetcher;

struct Entry {
    // None means allow-all (robots missing, unreachable, or unparseable).
    robot: Option<Robot>,
    expires_at: Instant,
}

impl Entry {
    fn allows(&self, url: &str) -> bool {
        self.robot.as_ref().map_or(true, |r| r.allowed(url))
    }
}

/// robots.txt decisions with a per-origin TTL cache.
///
/// A missing or failing robots.txt must never block the crawl, so every
/// non-200 outcome caches an allow-all policy for the same TTL. Concurrent
/// misses for one origin may each fetch once; the last write wins, which is
/// benign because a site's robots file is stable.
pub struct RobotsPolicy {
    user_agent: String,
    ttl: Duration,
    cache: Mutex<HashMap<String, Arc<Entry>>>,
}

impl RobotsPolicy {
    pub fn new(user_agent: &str, ttl: Duration) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_allowed(&self, fetcher: &HttpFetcher, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return true;
        };
        let origin = parsed.origin().ascii_serialization();
        if origin == "null" {
            return true;
        }

        if let Some(entry) = self.fresh(&origin) {
            return entry.allows(url);
        }

        let res = fetcher.fetch(&format!("{origin}/robots.txt")).await;
        let robot = if res.status == 200 && !res.text.is_empty() {
            match Robot::new(&self.user_agent, res.text.as_bytes()) {
                Ok(robot) => Some(robot),
                Err(err) => {
                    tracing::debug!(origin = %origin, error = %err, "robots parse failed, allowing");
                    None
                }
            }
        } else {
            tracing::debug!(origin = %origin, status = res.status, "no robots.txt, allowing");
            None
        };

        let entry = Arc::new(Entry {
            robot,
            expires_at: Instant::now() + self.ttl,
        });
        self.cache.lock().insert(origin, Arc::clone(&entry));
        entry.allows(url)
    }

    fn fresh(&self, origin: &str) -> Option<Arc<Entry>> {
        let mut cache = self.cache.lock();
        match cache.get(origin) {
            Some(entry) if entry.expires_at > Instant::now() => Some(Arc::clone(entry)),
            Some(_) => {
                cache.remove(origin);
                None
            }
            None => None,
        }
    }
}
