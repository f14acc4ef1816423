pub mod researcher;
pub mod summarizer;
pub mod writer;

use anyhow::Result;
use chrono::{DateTime, Local};
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::fetch::FactFetcher;
use crate::instrumentation::{RunLog, RunLogger, StageLog};
use crate::llm::{LlmClient, LlmResponse};

use researcher::Researcher;
use summarizer::Summarizer;
use writer::ReportWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Researcher,
    Summarizer,
    ReportWriter,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Researcher => "researcher",
            Stage::Summarizer => "summarizer",
            Stage::ReportWriter => "report writer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("topic is required")]
    EmptyTopic,
    #[error("{stage} stage failed: {source:#}")]
    Stage {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

/// Final Markdown document of a completed run.
#[derive(Debug, Clone)]
pub struct Report {
    pub topic: String,
    pub title: String,
    pub markdown: String,
    pub generated_at: DateTime<Local>,
}

impl Report {
    pub fn file_name(&self) -> String {
        format!("report_{}.md", self.generated_at.format("%Y%m%d_%H%M%S"))
    }
}

/// Report heading derived from the topic: trimmed, trailing periods removed.
pub fn report_title(topic: &str) -> String {
    topic.trim().trim_end_matches('.').trim_end().to_string()
}

/// Fixed three-stage chain: researcher, summarizer, report writer.
pub struct Crew {
    fetcher: FactFetcher,
    researcher: Researcher,
    summarizer: Summarizer,
    writer: ReportWriter,
    logger: Option<RunLogger>,
}

impl Crew {
    pub fn new(config: &Config) -> Result<Self> {
        let llm = LlmClient::new(
            &config.llm_api_key,
            &config.llm_api_url,
            config.max_tokens,
            Duration::from_secs(config.llm_timeout_secs),
        )?;
        let logger = config
            .run_log_dir
            .as_ref()
            .map(RunLogger::new)
            .transpose()?;

        Ok(Self {
            fetcher: FactFetcher::new(config)?,
            researcher: Researcher::new(llm.clone(), config.researcher_model.clone()),
            summarizer: Summarizer::new(llm.clone(), config.summarizer_model.clone()),
            writer: ReportWriter::new(llm, config.writer_model.clone()),
            logger,
        })
    }

    pub async fn run(&self, topic: &str) -> Result<(Report, RunLog), RunError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(RunError::EmptyTopic);
        }

        let run_start = Instant::now();
        let generated_at = Local::now();
        let title = report_title(topic);
        tracing::info!(topic, "starting research run");

        // Step 1: external facts, then the researcher
        let facts = self.fetcher.gather(topic).await;

        let started = Instant::now();
        let research = self
            .researcher
            .research(topic, &facts)
            .await
            .and_then(require_text)
            .map_err(stage_failed(Stage::Researcher))?;
        let research_log = stage_log(Stage::Researcher, self.researcher.model(), started, &research);

        // Step 2: summarize
        let started = Instant::now();
        let summary = self
            .summarizer
            .summarize(&research.text)
            .await
            .and_then(require_text)
            .map_err(stage_failed(Stage::Summarizer))?;
        let summary_log = stage_log(Stage::Summarizer, self.summarizer.model(), started, &summary);

        // Step 3: compose the report
        let started = Instant::now();
        let date = generated_at.format("%Y-%m-%d").to_string();
        let composed = self
            .writer
            .write(&title, &date, &summary.text)
            .await
            .and_then(require_text)
            .map_err(stage_failed(Stage::ReportWriter))?;
        let writer_log = stage_log(Stage::ReportWriter, self.writer.model(), started, &composed);

        let report = Report {
            topic: topic.to_string(),
            title,
            markdown: composed.text.trim().to_string(),
            generated_at,
        };

        let stages = vec![research_log, summary_log, writer_log];
        let run_log = RunLog {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            topic: topic.to_string(),
            fetch_latency_ms: facts.latency_ms,
            wiki_found: facts.has_wiki(),
            num_links: facts.links.len(),
            total_latency_ms: run_start.elapsed().as_millis() as u64,
            total_llm_input_tokens: stages.iter().map(|s| s.input_tokens).sum(),
            total_llm_output_tokens: stages.iter().map(|s| s.output_tokens).sum(),
            total_cost: stages.iter().map(|s| s.cost).sum(),
            stages,
            report_file: report.file_name(),
            final_report: report.markdown.clone(),
        };

        tracing::info!(run_id = %run_log.id, "{}", run_log.summary());

        if let Some(logger) = &self.logger {
            if let Err(e) = logger.write(&run_log) {
                tracing::warn!(error = %e, "failed to persist run log");
            }
        }

        Ok((report, run_log))
    }
}

fn require_text(response: LlmResponse) -> Result<LlmResponse> {
    if response.text.trim().is_empty() {
        anyhow::bail!("LLM returned an empty completion");
    }
    Ok(response)
}

fn stage_failed(stage: Stage) -> impl FnOnce(anyhow::Error) -> RunError {
    move |source| {
        tracing::error!(%stage, error = %source, "stage failed");
        RunError::Stage { stage, source }
    }
}

fn stage_log(stage: Stage, model: &str, started: Instant, response: &LlmResponse) -> StageLog {
    let latency_ms = started.elapsed().as_millis() as u64;
    tracing::info!(
        %stage,
        latency_ms,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "stage complete"
    );

    StageLog {
        stage: stage.as_str().to_string(),
        model: model.to_string(),
        latency_ms,
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        cost: response.cost,
        output_chars: response.text.len(),
    }
}
