//! Deterministic text projection of a page: prune chrome, pick the main
//! container, and emit a minimal `<article>`-wrapped document. Pure — the
//! same HTML always yields the same minimal form.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

// Subtrees under these tags are dropped entirely.
const REMOVABLE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "canvas", "iframe", "object", "embed",
    "form", "figure", "video", "audio", "header", "footer", "nav", "aside",
];

// Elements whose class/id/role mention any of these are dropped too.
const REMOVABLE_KEYWORDS: &[&str] = &[
    "cookie",
    "consent",
    "banner",
    "advert",
    "ad-",
    "promo",
    "subscribe",
    "subscription",
    "modal",
    "popup",
    "share",
    "social",
    "breadcrumbs",
    "breadcrumb",
    "sidebar",
    "menu",
    "header",
    "footer",
    "signin",
    "login",
    "comments",
];

fn sel(s: &str) -> Selector {
    Selector::parse(s).unwrap()
}

fn removable(el: &ElementRef) -> bool {
    if REMOVABLE_TAGS.contains(&el.value().name()) {
        return true;
    }
    for attr in ["class", "id", "role"] {
        if let Some(value) = el.value().attr(attr) {
            let value = value.to_ascii_lowercase();
            if REMOVABLE_KEYWORDS.iter().any(|k| value.contains(k)) {
                return true;
            }
        }
    }
    false
}

/// True when any ancestor strictly between `el` and the node `stop` is
/// removable.
fn under_removable(el: ElementRef, stop: NodeId) -> bool {
    for anc in el.ancestors() {
        if anc.id() == stop {
            break;
        }
        if let Some(anc) = ElementRef::wrap(anc) {
            if removable(&anc) {
                return true;
            }
        }
    }
    false
}

/// Whitespace-normalized text of `el`, skipping removable subtrees.
fn clean_text(el: ElementRef) -> String {
    let mut buf = String::new();
    collect_text(el, &mut buf);
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(el: ElementRef, buf: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            buf.push_str(text);
            buf.push(' ');
        } else if let Some(child) = ElementRef::wrap(child) {
            if !removable(&child) {
                collect_text(child, buf);
            }
        }
    }
}

/// The five-entity escape applied to every emitted text fragment.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Main container: first acceptable `<article>`, else `<main>`, else body.
fn container(doc: &Html) -> Option<ElementRef<'_>> {
    let root = doc.root_element().id();
    for name in ["article", "main"] {
        if let Some(el) = doc
            .select(&sel(name))
            .find(|el| !removable(el) && !under_removable(*el, root))
        {
            return Some(el);
        }
    }
    doc.select(&sel("body")).next()
}

fn collect_blocks(root: ElementRef, text_only: bool) -> Vec<String> {
    let stop = root.id();
    let mut blocks = Vec::new();

    for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        for h in root.select(&sel(tag)) {
            if under_removable(h, stop) || removable(&h) {
                continue;
            }
            let txt = escape(&clean_text(h));
            if !txt.is_empty() {
                blocks.push(format!("<{tag}>{txt}</{tag}>"));
            }
        }
    }

    for p in root.select(&sel("p")) {
        if under_removable(p, stop) || removable(&p) {
            continue;
        }
        let txt = escape(&clean_text(p));
        if !txt.is_empty() {
            blocks.push(format!("<p>{txt}</p>"));
        }
    }

    if !text_only {
        for list in root.select(&sel("ul, ol")) {
            if under_removable(list, stop) || removable(&list) {
                continue;
            }
            let tag = list.value().name().to_string();
            let items: Vec<String> = list
                .select(&sel("li"))
                .filter(|li| !under_removable(*li, stop) && !removable(li))
                .map(|li| escape(&clean_text(li)))
                .collect();
            if items.is_empty() {
                continue;
            }
            blocks.push(format!("<{tag}>"));
            for item in items {
                blocks.push(format!("  <li>{item}</li>"));
            }
            blocks.push(format!("</{tag}>"));
        }

        for pre in root.select(&sel("pre")) {
            if under_removable(pre, stop) || removable(&pre) {
                continue;
            }
            let txt = escape(&clean_text(pre));
            if !txt.is_empty() {
                blocks.push(format!("<pre><code>{txt}</code></pre>"));
            }
        }

        for quote in root.select(&sel("blockquote")) {
            if under_removable(quote, stop) || removable(&quote) {
                continue;
            }
            let txt = escape(&clean_text(quote));
            if !txt.is_empty() {
                blocks.push(format!("<blockquote>{txt}</blockquote>"));
            }
        }
    }

    if blocks.is_empty() {
        let txt = escape(&clean_text(root));
        if !txt.is_empty() {
            blocks.push(format!("<p>{txt}</p>"));
        }
    }

    blocks
}

/// Build the minimal `<article>` document for a page.
pub fn extract_minimal_html(html: &str, text_only: bool) -> String {
    let doc = Html::parse_document(html);
    let blocks = match container(&doc) {
        Some(root) => collect_blocks(root, text_only),
        None => Vec::new(),
    };
    let title = doc
        .select(&sel("title"))
        .next()
        .map(|t| escape(t.text().collect::<String>().trim()))
        .unwrap_or_default();
    let title_tag = if title.is_empty() {
        String::new()
    } else {
        format!("<title>{title}</title>")
    };
    format!(
        "<html><head><meta charset=\"utf-8\">{}</head><body><article>{}</article></body></html>",
        title_tag,
        blocks.join("\n")
    )
}

/// Title and plain article text of a previously saved minimal document.
pub fn page_title_and_text(html: &str) -> (String, String) {
    let doc = Html::parse_document(html);
    let title = doc
        .select(&sel("title"))
        .next()
        .map(|t| {
            t.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    let text = doc
        .select(&sel("article"))
        .next()
        .or_else(|| doc.select(&sel("body")).next())
        .map(clean_text)
        .unwrap_or_default();
    (title, text)
}
