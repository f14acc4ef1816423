use anyhow::Result;

use crate::llm::{LlmClient, LlmResponse};

const SYSTEM_PROMPT: &str = "You are the Summarizer, a clarity-first technical note taker. \
Condense findings into crisp bullets with no fluff.";

const INSTRUCTIONS: &str = "Summarize the research facts into at most 8 bullets (<= 110 words total). \
Avoid redundancy. Keep only the most decision-useful points. \
After the bullets, repeat the markdown source list from the research notes unchanged.";

pub struct Summarizer {
    llm: LlmClient,
    model: String,
}

impl Summarizer {
    pub fn new(llm: LlmClient, model: String) -> Self {
        Self { llm, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn summarize(&self, research_notes: &str) -> Result<LlmResponse> {
        let user_message = format!("{}\n\nRESEARCH NOTES:\n{}", INSTRUCTIONS, research_notes);
        self.llm
            .complete(&self.model, Some(SYSTEM_PROMPT), &user_message)
            .await
    }
}
