use scraper::{Html, Selector};

/// Trimmed `href` of every `<a>` element in document order. No filtering
/// here; the caller canonicalizes and drops what it does not want.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("a").unwrap();
    doc.select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_in_document_order() {
        let html = r#"<html><body>
            <a href="/first">one</a>
            <p><a href="https://other.test/second">two</a></p>
            <a name="anchor-without-href">three</a>
            <a href="  /spaced  ">four</a>
        </body></html>"#;
        assert_eq!(
            extract_hrefs(html),
            vec!["/first", "https://other.test/second", "/spaced"]
        );
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(extract_hrefs("").is_empty());
        assert!(extract_hrefs("<p>no links</p>").is_empty());
    }
}
