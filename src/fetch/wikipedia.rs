use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::time::Duration;

/// Everything except RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const TIMEOUT: Duration = Duration::from_secs(8);

/// Wikimedia rejects requests without an identifying User-Agent.
const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (topic research reports)"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiSummary {
    pub title: String,
    pub summary: String,
    pub url: String,
}

impl WikiSummary {
    pub fn empty(topic: &str) -> Self {
        Self {
            title: topic.to_string(),
            summary: String::new(),
            url: String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SummaryResponse {
    title: Option<String>,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    content_urls: ContentUrls,
}

#[derive(Debug, Default, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: PageUrls,
}

#[derive(Debug, Default, Deserialize)]
struct PageUrls {
    #[serde(default)]
    page: String,
}

/// Client for the Wikipedia REST `page/summary` endpoint.
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: reqwest::Client,
    api_base: String,
}

impl WikiClient {
    pub fn new(api_base: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build Wikipedia HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn summary_url(&self, topic: &str) -> String {
        format!("{}/page/summary/{}", self.api_base, encode_title(topic))
    }

    /// Best-effort lookup: any failure yields an empty summary.
    pub async fn summary(&self, topic: &str) -> WikiSummary {
        match self.try_summary(topic).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(topic, error = %e, "wikipedia lookup failed");
                WikiSummary::empty(topic)
            }
        }
    }

    async fn try_summary(&self, topic: &str) -> Result<WikiSummary> {
        let response = self
            .client
            .get(self.summary_url(topic))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to reach Wikipedia")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Wikipedia returned {}", status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read Wikipedia response")?;
        parse_summary(topic, &body)
    }
}

pub fn parse_summary(topic: &str, body: &str) -> Result<WikiSummary> {
    let parsed: SummaryResponse =
        serde_json::from_str(body).context("Failed to parse Wikipedia summary")?;

    Ok(WikiSummary {
        title: parsed
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| topic.to_string()),
        summary: parsed.extract,
        url: parsed.content_urls.desktop.page,
    })
}

fn encode_title(topic: &str) -> String {
    let title = topic.trim().replace(' ', "_");
    utf8_percent_encode(&title, PATH_SEGMENT).to_string()
}
