/// Split a `Content-Type` header into (mime, optional charset), both
/// lowercased and trimmed.
pub fn parse_content_type(header: &str) -> (String, Option<String>) {
    let mut parts = header.split(';');
    let mime = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let mut charset = None;
    for p in parts {
        let p = p.trim().to_ascii_lowercase();
        if let Some(rest) = p.strip_prefix("charset=") {
            charset = Some(rest.trim().trim_matches('"').to_string());
            break;
        }
    }
    (mime, charset)
}

pub fn is_html(header: &str) -> bool {
    parse_content_type(header).0.starts_with("text/html")
}
