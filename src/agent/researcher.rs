use anyhow::Result;

use crate::fetch::FactBundle;
use crate::llm::{LlmClient, LlmResponse};

const SYSTEM_PROMPT: &str = "You are the Researcher, a fast, factual, concise web scout. \
Your goal is to collect key facts and 5 credible sources for the topic.";

pub struct Researcher {
    llm: LlmClient,
    model: String,
}

impl Researcher {
    pub fn new(llm: LlmClient, model: String) -> Self {
        Self { llm, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn research(&self, topic: &str, facts: &FactBundle) -> Result<LlmResponse> {
        let user_message = prompt(topic, facts);
        self.llm
            .complete(&self.model, Some(SYSTEM_PROMPT), &user_message)
            .await
    }
}

fn prompt(topic: &str, facts: &FactBundle) -> String {
    format!(
        "CONTEXT (external snippets & links):\n{}\n\n\
         Use the provided external snippets and links to compile facts about the topic: '{}'. \
         Return:\n\
         1) 5-7 bullet points of key facts (<= 120 words total)\n\
         2) A short risks/limitations note (<= 40 words)\n\
         3) A list of 5 sources as markdown list [title](url)\n\
         Be concise and specific. No repetition.",
        facts.context_block(),
        topic
    )
}
