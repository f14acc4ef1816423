use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    max_tokens: u32,
}

// OpenAI-compatible chat completions format (Groq, OpenRouter, ...)
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    cost: Option<f64>,
}

/// Error envelope returned by OpenAI-compatible providers on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<serde_json::Value>,
}

impl ApiErrorDetail {
    fn describe(&self) -> String {
        let code = match &self.code {
            Some(serde_json::Value::String(c)) => Some(c.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        match (self.kind.as_deref(), code) {
            (Some(kind), Some(code)) => format!("{} [{}/{}]", self.message, kind, code),
            (Some(kind), None) => format!("{} [{}]", self.message, kind),
            (None, Some(code)) => format!("{} [{}]", self.message, code),
            (None, None) => self.message.clone(),
        }
    }
}

/// Readable message for a failed completion; falls back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.describe(),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
}

impl LlmClient {
    pub fn new(api_key: &str, api_url: &str, max_tokens: u32, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build LLM HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
            max_tokens,
        })
    }

    pub async fn complete(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        user_message: &str,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::new();
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: user_message.to_string(),
        });

        let request = ChatCompletionRequest {
            model: model.to_string(),
            max_tokens: self.max_tokens,
            messages,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to LLM API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error ({}): {}", status, error_message(&body));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse LLM API response")?;

        let text = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("")
            .to_string();

        let (input_tokens, output_tokens, cost) = match api_response.usage {
            Some(usage) => (
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.cost.unwrap_or(0.0),
            ),
            None => (0, 0, 0.0),
        };

        Ok(LlmResponse {
            text,
            input_tokens,
            output_tokens,
            cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_without_usage_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hi"));
    }

    #[test]
    fn provider_error_envelope_is_summarised() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(
            error_message(body),
            "Invalid API Key [invalid_request_error/invalid_api_key]"
        );

        let body = r#"{"error":{"message":"Rate limit reached for model","type":"tokens"}}"#;
        assert_eq!(error_message(body), "Rate limit reached for model [tokens]");
    }

    #[test]
    fn unstructured_error_bodies_pass_through() {
        assert_eq!(error_message("provider exploded\n"), "provider exploded");
        assert_eq!(error_message(""), "empty response body");
    }

    #[test]
    fn request_serializes_system_then_user() {
        let request = ChatCompletionRequest {
            model: "m".into(),
            max_tokens: 10,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: "s".into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: "u".into(),
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
        assert_eq!(json["max_tokens"], 10);
    }
}
