use bloom::{BloomFilter, ASMS};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Set of canonical URLs already accepted by any worker.
///
/// Exact mode keeps every URL in a hash set; approximate mode trades a small
/// false-positive rate for bounded memory on very large runs. The crawler
/// uses exact mode unless told otherwise.
pub struct Deduplicator {
    inner: Mutex<Inner>,
}

enum Inner {
    Exact(HashSet<String>),
    Approximate { filter: BloomFilter, count: usize },
}

impl Deduplicator {
    pub fn exact() -> Self {
        Self {
            inner: Mutex::new(Inner::Exact(HashSet::new())),
        }
    }

    /// Bloom-filter-backed set sized for `expected_items` at `error_rate`
    /// (e.g. 0.01 for ~1% false positives).
    pub fn approximate(expected_items: u32, error_rate: f32) -> Self {
        Self {
            inner: Mutex::new(Inner::Approximate {
                filter: BloomFilter::with_rate(error_rate, expected_items.max(1)),
                count: 0,
            }),
        }
    }

    pub fn seen(&self, url: &str) -> bool {
        match &*self.inner.lock() {
            Inner::Exact(set) => set.contains(url),
            Inner::Approximate { filter, .. } => filter.contains(&url),
        }
    }

    pub fn add(&self, url: &str) {
        match &mut *self.inner.lock() {
            Inner::Exact(set) => {
                set.insert(url.to_string());
            }
            Inner::Approximate { filter, count } => {
                if !filter.contains(&url) {
                    filter.insert(&url);
                    *count += 1;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        match &*self.inner.lock() {
            Inner::Exact(set) => set.len(),
            Inner::Approximate { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_mode_tracks_membership() {
        let d = Deduplicator::exact();
        assert!(!d.seen("https://example.com/a"));
        d.add("https://example.com/a");
        assert!(d.seen("https://example.com/a"));
        assert!(!d.seen("https://example.com/b"));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn exact_mode_add_is_idempotent() {
        let d = Deduplicator::exact();
        d.add("https://example.com/a");
        d.add("https://example.com/a");
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn approximate_mode_has_no_false_negatives() {
        let d = Deduplicator::approximate(10_000, 0.01);
        for i in 0..1000 {
            d.add(&format!("https://example.com/p{i}"));
        }
        for i in 0..1000 {
            assert!(d.seen(&format!("https://example.com/p{i}")));
        }
        assert_eq!(d.len(), 1000);
    }
}
