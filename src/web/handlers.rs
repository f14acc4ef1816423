use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::page::{render_page, PageState};
use super::AppState;
use crate::agent::RunError;

#[derive(Debug, Deserialize)]
pub struct RunForm {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub topic: String,
    pub title: String,
    pub file_name: String,
    pub markdown: String,
    pub run_id: String,
}

impl RunError {
    fn status(&self) -> StatusCode {
        match self {
            RunError::EmptyTopic => StatusCode::UNPROCESSABLE_ENTITY,
            RunError::Stage { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RunError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

pub async fn index() -> Html<String> {
    Html(render_page(&PageState::Idle))
}

pub async fn health() -> &'static str {
    "ok"
}

/// Runs the crew for the submitted topic and renders the outcome.
pub async fn run(State(state): State<AppState>, Form(form): Form<RunForm>) -> Response {
    match state.crew.run(&form.topic).await {
        Ok((report, _)) => Html(render_page(&PageState::Done { report: &report })).into_response(),
        Err(err) => {
            let status = err.status();
            let page = match &err {
                RunError::EmptyTopic => render_page(&PageState::TopicRequired),
                RunError::Stage { .. } => render_page(&PageState::Failed {
                    topic: form.topic.trim(),
                    message: &err.to_string(),
                }),
            };
            (status, Html(page)).into_response()
        }
    }
}

pub async fn research(
    State(state): State<AppState>,
    Json(payload): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, RunError> {
    let (report, run_log) = state.crew.run(&payload.topic).await?;

    Ok(Json(ResearchResponse {
        file_name: report.file_name(),
        topic: report.topic,
        title: report.title,
        markdown: report.markdown,
        run_id: run_log.id,
    }))
}
