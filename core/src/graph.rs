use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;

/// In-memory directed graph of canonical URLs. Duplicate edges collapse;
/// iteration order is first-insertion order so exports are deterministic.
#[derive(Default)]
pub struct GraphStore {
    edges: Mutex<IndexMap<String, IndexSet<String>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&self, src: &str, dst: &str) {
        self.edges
            .lock()
            .entry(src.to_string())
            .or_default()
            .insert(dst.to_string());
    }

    /// Union of all referenced URLs, sources first within insertion order.
    pub fn nodes(&self) -> Vec<String> {
        let edges = self.edges.lock();
        let mut seen = IndexSet::new();
        for (src, dsts) in edges.iter() {
            seen.insert(src.clone());
            for dst in dsts {
                seen.insert(dst.clone());
            }
        }
        seen.into_iter().collect()
    }

    pub fn edges(&self) -> Vec<(String, String)> {
        let edges = self.edges.lock();
        let mut out = Vec::with_capacity(edges.len());
        for (src, dsts) in edges.iter() {
            for dst in dsts {
                out.push((src.clone(), dst.clone()));
            }
        }
        out
    }

    pub fn edge_count(&self) -> usize {
        self.edges.lock().values().map(IndexSet::len).sum()
    }

    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }
}
