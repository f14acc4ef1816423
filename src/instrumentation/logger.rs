use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageLog {
    pub stage: String,
    pub model: String,
    pub latency_ms: u64,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
    pub output_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub id: String,
    pub timestamp: String,
    pub topic: String,
    pub fetch_latency_ms: u64,
    pub wiki_found: bool,
    pub num_links: usize,
    pub stages: Vec<StageLog>,
    pub total_latency_ms: u64,
    pub total_llm_input_tokens: u32,
    pub total_llm_output_tokens: u32,
    pub total_cost: f64,
    pub report_file: String,
    pub final_report: String,
}

impl RunLog {
    pub fn total_tokens(&self) -> u32 {
        self.total_llm_input_tokens + self.total_llm_output_tokens
    }

    /// Cost in USD as reported by the provider, zero when it reports none.
    pub fn cost(&self) -> f64 {
        self.total_cost
    }

    pub fn summary(&self) -> String {
        format!(
            "Stages: {} | Total latency: {:.1}s | Wikipedia: {} | Links: {} | Tokens used by LLM: {} | Cost: ${:.4}",
            self.stages.len(),
            self.total_latency_ms as f64 / 1000.0,
            if self.wiki_found { "yes" } else { "no" },
            self.num_links,
            self.total_tokens(),
            self.cost(),
        )
    }
}

/// Appends completed runs to `runs.jsonl` inside a directory.
pub struct RunLogger {
    dir: PathBuf,
}

impl RunLogger {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create logs directory")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("runs.jsonl")
    }

    pub fn write(&self, run_log: &RunLog) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .context("Failed to open log file")?;

        let json = serde_json::to_string(run_log).context("Failed to serialize run log")?;
        writeln!(file, "{}", json).context("Failed to write log")?;

        Ok(())
    }
}
