use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::config::MAX_LINKS;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    pub title: String,
    pub url: String,
}

/// Scrapes result links from a DuckDuckGo-style HTML results page.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    search_url: String,
}

impl SearchClient {
    pub fn new(search_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build search HTTP client")?;

        Ok(Self {
            client,
            search_url: search_url.to_string(),
        })
    }

    /// Best-effort: any failure yields an empty list. Never more than five links.
    pub async fn links(&self, query: &str, max_results: usize) -> Vec<SourceLink> {
        match self.try_links(query, max_results).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(query, error = %e, "search scrape failed");
                Vec::new()
            }
        }
    }

    async fn try_links(&self, query: &str, max_results: usize) -> Result<Vec<SourceLink>> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await
            .context("Failed to reach search engine")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("search engine returned {}", status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read search results page")?;

        Ok(parse_result_links(&body, max_results))
    }
}

/// Extracts `a.result__a` anchors in document order, skipping anchors without
/// a title or href.
pub fn parse_result_links(html: &str, max_results: usize) -> Vec<SourceLink> {
    let limit = max_results.min(MAX_LINKS);
    let doc = Html::parse_document(html);
    let Ok(link_sel) = Selector::parse("a.result__a") else {
        return Vec::new();
    };

    doc.select(&link_sel)
        .filter_map(|el| {
            let href = el.value().attr("href").unwrap_or("").trim();
            let title = el
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            if href.is_empty() || title.is_empty() {
                return None;
            }
            Some(SourceLink {
                title,
                url: resolve_href(href),
            })
        })
        .take(limit)
        .collect()
}

/// Unwraps DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=<encoded>&rut=...`).
fn resolve_href(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + 5;
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded)
                .decode_utf8_lossy()
                .into_owned();
        }
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    href.to_string()
}
