pub mod search;
pub mod wikipedia;

use anyhow::Result;
use std::time::Instant;

use crate::config::Config;

pub use search::{SearchClient, SourceLink};
pub use wikipedia::{WikiClient, WikiSummary};

/// Longest Wikipedia extract passed on to the researcher stage, in characters.
const WIKI_SUMMARY_CHARS: usize = 800;

/// External facts gathered for one topic. Either half may be empty.
#[derive(Debug, Clone)]
pub struct FactBundle {
    pub wiki: WikiSummary,
    pub links: Vec<SourceLink>,
    pub latency_ms: u64,
}

impl FactBundle {
    /// Compact context block prepended to the researcher instructions.
    pub fn context_block(&self) -> String {
        let wiki_url = if self.wiki.url.is_empty() {
            "N/A"
        } else {
            self.wiki.url.as_str()
        };

        let quick_links = if self.links.is_empty() {
            "QUICK_LINKS: N/A".to_string()
        } else {
            let lines = self
                .links
                .iter()
                .map(|l| format!("- {}: {}", l.title, l.url))
                .collect::<Vec<_>>()
                .join("\n");
            format!("QUICK_LINKS:\n{}", lines)
        };

        format!(
            "WIKIPEDIA: {}\nWIKI_URL: {}\n{}",
            truncate_chars(&self.wiki.summary, WIKI_SUMMARY_CHARS),
            wiki_url,
            quick_links
        )
    }

    pub fn has_wiki(&self) -> bool {
        !self.wiki.summary.is_empty()
    }
}

pub struct FactFetcher {
    wiki: WikiClient,
    search: SearchClient,
    max_links: usize,
}

impl FactFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            wiki: WikiClient::new(&config.wiki_api_base)?,
            search: SearchClient::new(&config.search_url)?,
            max_links: config.max_links,
        })
    }

    /// Wikipedia first, then the search page. Never fails.
    pub async fn gather(&self, topic: &str) -> FactBundle {
        let start = Instant::now();
        let wiki = self.wiki.summary(topic).await;
        let links = self.search.links(topic, self.max_links).await;

        tracing::info!(
            topic,
            wiki_title = %wiki.title,
            wiki_chars = wiki.summary.len(),
            links = links.len(),
            "gathered external facts"
        );

        FactBundle {
            wiki,
            links,
            latency_ms: start.elapsed().as_millis() as u64,
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
