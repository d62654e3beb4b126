use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect, Client};
use std::time::Duration;

use crate::types::FetchResult;

/// Keep-alive HTTP client shared by every worker for the whole run.
///
/// `fetch` absorbs all transport errors into `FetchResult{status: 0}` so a
/// single unreachable URL never aborts the crawl.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration, max_redirects: usize) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(max_redirects))
            // Tolerant mode: sites with broken certificates are still crawled.
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> FetchResult {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(url, error = %err, "fetch failed");
                return FetchResult {
                    url: url.to_string(),
                    final_url: String::new(),
                    status: 0,
                    content_type: String::new(),
                    text: String::new(),
                };
            }
        };

        let final_url = resp.url().to_string();
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        // Decodes with the response charset, falling back to UTF-8.
        let text = match resp.text().await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(url, error = %err, "body read failed");
                String::new()
            }
        };

        FetchResult {
            url: url.to_string(),
            final_url,
            status,
            content_type,
            text,
        }
    }
}
