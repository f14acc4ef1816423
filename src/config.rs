use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Hard ceiling on scraped source links per run.
pub const MAX_LINKS: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub researcher_model: String,
    pub summarizer_model: String,
    pub writer_model: String,
    pub max_tokens: u32,
    pub llm_timeout_secs: u64,
    pub wiki_api_base: String,
    pub search_url: String,
    pub max_links: usize,
    pub bind_addr: SocketAddr,
    pub run_log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the
    /// process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let llm_api_key = var("LLM_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or_else(|| var("GROQ_API_KEY"))
            .filter(|k| !k.trim().is_empty())
            .context("LLM_API_KEY must be set")?;

        let llm_model = var("LLM_MODEL").unwrap_or_else(|| "llama-3.1-8b-instant".into());
        let wiki_lang = var("WIKI_LANG").unwrap_or_else(|| "en".into());

        let max_links: usize = var("MAX_LINKS")
            .unwrap_or_else(|| MAX_LINKS.to_string())
            .parse()
            .context("MAX_LINKS must be a number")?;

        let run_log_dir = match var("RUN_LOG_DIR") {
            Some(dir) if dir.eq_ignore_ascii_case("off") || dir.trim().is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from("logs")),
        };

        Ok(Self {
            llm_api_key,
            llm_api_url: var("LLM_API_URL")
                .unwrap_or_else(|| "https://api.groq.com/openai/v1/chat/completions".into()),
            researcher_model: var("RESEARCHER_MODEL").unwrap_or_else(|| llm_model.clone()),
            summarizer_model: var("SUMMARIZER_MODEL").unwrap_or_else(|| llm_model.clone()),
            writer_model: var("WRITER_MODEL").unwrap_or_else(|| llm_model.clone()),
            max_tokens: var("LLM_MAX_TOKENS")
                .unwrap_or_else(|| "1024".into())
                .parse()
                .context("LLM_MAX_TOKENS must be a number")?,
            llm_timeout_secs: var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|| "60".into())
                .parse()
                .context("LLM_TIMEOUT_SECS must be a number")?,
            wiki_api_base: var("WIKI_API_BASE")
                .unwrap_or_else(|| format!("https://{}.wikipedia.org/api/rest_v1", wiki_lang)),
            search_url: var("SEARCH_URL")
                .unwrap_or_else(|| "https://html.duckduckgo.com/html/".into()),
            max_links: max_links.clamp(1, MAX_LINKS),
            bind_addr: var("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:8501".into())
                .parse()
                .context("BIND_ADDR must be a socket address like 127.0.0.1:8501")?,
            run_log_dir,
        })
    }
}
