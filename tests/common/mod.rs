//! Shared wiremock fixtures standing in for the LLM provider, Wikipedia and
//! the search results page.

#![allow(dead_code)]

use research_crew::Config;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REPORT: &str = "# Solar power\nGenerated on 2026-10-18\n\n## Executive Summary\n- Cheap\n\n## References\n- [IEA](https://iea.org)\n";

/// Config pointing every external endpoint at the mock server.
pub fn test_config(server: &MockServer) -> Config {
    let uri = server.uri();
    Config {
        llm_api_key: "test-key".into(),
        llm_api_url: format!("{}/chat/completions", uri),
        researcher_model: "researcher-model".into(),
        summarizer_model: "summarizer-model".into(),
        writer_model: "writer-model".into(),
        max_tokens: 256,
        llm_timeout_secs: 5,
        wiki_api_base: format!("{}/wiki", uri),
        search_url: format!("{}/html/", uri),
        max_links: 5,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        run_log_dir: None,
    }
}

pub fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 100, "completion_tokens": 40}
    }))
}

pub fn results_page(count: usize) -> String {
    let anchors: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="result"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fsource{i}.example%2F&amp;rut=x">Source {i}</a></div>"#
            )
        })
        .collect();
    format!("<html><body>{anchors}</body></html>")
}

pub async fn mount_wiki(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex("^/wiki/page/summary/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Solar power",
            "extract": "Solar power is the conversion of energy from sunlight into electricity.",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Solar_power"}}
        })))
        .mount(server)
        .await;
}

pub async fn mount_search(server: &MockServer, anchors: usize) {
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(results_page(anchors), "text/html"))
        .mount(server)
        .await;
}

pub async fn mount_llm(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(text))
        .mount(server)
        .await;
}

/// LLM that answers `successes` calls and then fails with 500.
pub async fn mount_llm_failing_after(server: &MockServer, successes: u64) {
    if successes > 0 {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("intermediate notes"))
            .up_to_n_times(successes)
            .with_priority(1)
            .mount(server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("provider exploded"))
        .with_priority(2)
        .mount(server)
        .await;
}

/// Bodies of every chat-completion request received, in order.
pub async fn llm_requests(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/chat/completions")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
