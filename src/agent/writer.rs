use anyhow::Result;

use crate::llm::{LlmClient, LlmResponse};

const SYSTEM_PROMPT: &str = "You are the Report Writer. You write clean, structured reports \
with tight language. Draft a professional Markdown report from bullets and sources.";

pub struct ReportWriter {
    llm: LlmClient,
    model: String,
}

impl ReportWriter {
    pub fn new(llm: LlmClient, model: String) -> Self {
        Self { llm, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn write(&self, title: &str, date: &str, summary: &str) -> Result<LlmResponse> {
        let user_message = format!("{}\n\nSUMMARY:\n{}", instructions(title, date), summary);
        self.llm
            .complete(&self.model, Some(SYSTEM_PROMPT), &user_message)
            .await
    }
}

fn instructions(title: &str, date: &str) -> String {
    format!(
        "Write a final Markdown report from the summary and sources with this exact structure:\n\
         # {title}\n\
         Generated on {date}\n\n\
         ## Executive Summary\n\
         - 5 to 8 bullets (<= 110 words total)\n\n\
         ## Key Insights\n\
         - 5 bullets, each with 1 line of explanation (<= 120 words total)\n\n\
         ## Risks & Limitations\n\
         - 3 short bullets\n\n\
         ## References\n\
         - Exactly 5 markdown links\n\
         Keep language tight and neutral. Avoid filler."
    )
}
