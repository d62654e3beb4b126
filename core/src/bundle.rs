//! Site-bundle assembly: join `graph.json` with the saved minimal HTML tree
//! into one self-contained JSON document.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fs::{self, File};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use url::Url;

use crate::content::page_title_and_text;
use crate::export::read_graph_json;
use crate::urls::{canonicalize, url_to_content_path, CanonicalPolicy};

#[derive(Debug, Serialize)]
pub struct PageRecord {
    pub id: usize,
    pub url: String,
    pub status: Option<u16>,
    pub title: String,
    pub text: String,
    pub content_path: String,
    pub depth: Option<usize>,
    pub fqdn: String,
    pub path: String,
    pub cluster: String,
}

#[derive(Debug, Serialize)]
pub struct SiteBundle {
    pub site_url: Option<String>,
    pub crawled_at: String,
    pub pages: Vec<PageRecord>,
    pub edges: Vec<(usize, usize)>,
}

/// (fqdn, path, cluster) for a canonical URL. The cluster is `/` for root
/// pages and `/<first-path-segment>` otherwise.
fn fqdn_path_cluster(url: &str) -> (String, String, String) {
    let Ok(parsed) = Url::parse(url) else {
        return (String::new(), "/".to_string(), "/".to_string());
    };
    let fqdn = parsed.host_str().unwrap_or_default().to_string();
    let path = if parsed.path().is_empty() {
        "/".to_string()
    } else {
        parsed.path().to_string()
    };
    let cluster = match path.split('/').find(|s| !s.is_empty()) {
        Some(first) => format!("/{first}"),
        None => "/".to_string(),
    };
    (fqdn, path, cluster)
}

/// Shortest-path hop counts from `root_url` along directed edges. Empty when
/// the root is absent from the node set.
fn compute_depths(
    nodes: &[String],
    edges: &[(String, String)],
    root_url: Option<&str>,
) -> HashMap<String, usize> {
    let mut depths = HashMap::new();
    let Some(root_url) = root_url else {
        return depths;
    };
    let Some(root) = canonicalize(root_url, None, &CanonicalPolicy::default()) else {
        return depths;
    };
    if !nodes.iter().any(|n| *n == root) {
        return depths;
    }

    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for (src, dst) in edges {
        adj.entry(src.as_str()).or_default().push(dst.as_str());
    }

    depths.insert(root.clone(), 0);
    let mut queue = VecDeque::from([root]);
    while let Some(u) = queue.pop_front() {
        let d = depths[&u];
        for &v in adj.get(u.as_str()).into_iter().flatten() {
            if !depths.contains_key(v) {
                depths.insert(v.to_string(), d + 1);
                queue.push_back(v.to_string());
            }
        }
    }
    depths
}

/// Assemble the bundle from a crawl's `graph.json` and content directory.
///
/// Nodes outside `site_url`'s FQDN (suffix match, subdomains included) are
/// dropped when a site is given; pages whose minimal HTML is missing or has
/// neither title nor text are omitted; edges are remapped to the dense page
/// ids and dropped when either endpoint was omitted.
pub fn build_site_bundle(
    graph_json: &Path,
    content_dir: &Path,
    site_url: Option<&str>,
    root_url: Option<&str>,
) -> Result<SiteBundle> {
    let (all_nodes, raw_edges) = read_graph_json(graph_json)?;

    let nodes: Vec<String> = match site_url {
        Some(site) => {
            let (site_fqdn, _, _) = fqdn_path_cluster(site);
            all_nodes
                .into_iter()
                .filter(|u| fqdn_path_cluster(u).0.ends_with(&site_fqdn))
                .collect()
        }
        None => all_nodes,
    };

    let root_url = root_url.or(site_url);
    let depths = compute_depths(&nodes, &raw_edges, root_url);

    let mut pages: Vec<PageRecord> = Vec::new();
    let mut url_to_id: HashMap<String, usize> = HashMap::new();
    for url in &nodes {
        let content_path = url_to_content_path(url, content_dir);
        let Ok(html) = fs::read_to_string(&content_path) else {
            continue;
        };
        let (title, text) = page_title_and_text(&html);
        if title.is_empty() && text.is_empty() {
            continue;
        }

        let rel_path = content_path
            .strip_prefix(content_dir)
            .unwrap_or(&content_path)
            .to_string_lossy()
            .to_string();
        let (fqdn, path, cluster) = fqdn_path_cluster(url);
        let id = pages.len();
        url_to_id.insert(url.clone(), id);
        pages.push(PageRecord {
            id,
            url: url.clone(),
            status: None,
            title,
            text,
            content_path: rel_path,
            depth: depths.get(url).copied(),
            fqdn,
            path,
            cluster,
        });
    }

    let edges: Vec<(usize, usize)> = raw_edges
        .iter()
        .filter_map(|(src, dst)| match (url_to_id.get(src), url_to_id.get(dst)) {
            (Some(&s), Some(&d)) => Some((s, d)),
            _ => None,
        })
        .collect();

    let crawled_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("formatting bundle timestamp")?;

    Ok(SiteBundle {
        site_url: site_url.map(|s| s.to_string()),
        crawled_at,
        pages,
        edges,
    })
}

pub fn write_site_bundle(path: &Path, bundle: &SiteBundle) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(file, bundle)?;
    Ok(())
}
