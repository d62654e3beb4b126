use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct GraphFile {
    nodes: Vec<String>,
    edges: Vec<(String, String)>,
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

/// `src,dst` rows, one per distinct edge.
pub fn write_edges_csv(path: &Path, edges: &[(String, String)]) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(["src", "dst"])?;
    for (src, dst) in edges {
        wtr.write_record([src, dst])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `{"nodes":[url,...],"edges":[[src,dst],...]}`.
pub fn write_graph_json(path: &Path, nodes: Vec<String>, edges: Vec<(String, String)>) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(file, &GraphFile { nodes, edges })?;
    Ok(())
}

pub fn read_graph_json(path: &Path) -> Result<(Vec<String>, Vec<(String, String)>)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let graph: GraphFile = serde_json::from_reader(file)?;
    Ok((graph.nodes, graph.edges))
}
