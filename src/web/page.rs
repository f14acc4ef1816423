//! Server-rendered single page: topic form, status notice, and report view.

use base64::{engine::general_purpose::STANDARD, Engine};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use pulldown_cmark_escape::{escape_href, escape_html};

use crate::agent::Report;

/// What the page shows for one request.
pub enum PageState<'a> {
    Idle,
    TopicRequired,
    Failed { topic: &'a str, message: &'a str },
    Done { report: &'a Report },
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
form{display:flex;gap:.5rem}input{flex:1;padding:.5rem}button{padding:.5rem 1rem}\
.notice{padding:.75rem;border-radius:4px;margin:1rem 0}.warn{background:#fff4d6}.error{background:#fde2e2}\
pre{background:#f4f4f4;padding:1rem;overflow-x:auto}.report{border-top:1px solid #ddd;margin-top:1.5rem}";

pub fn render_page(state: &PageState<'_>) -> String {
    let topic = match state {
        PageState::Idle | PageState::TopicRequired => "",
        PageState::Failed { topic, .. } => topic,
        PageState::Done { report } => report.topic.as_str(),
    };

    let body = match state {
        PageState::Idle => String::new(),
        PageState::TopicRequired => {
            r#"<div class="notice warn" id="topic-required">Please enter a topic to research.</div>"#
                .to_string()
        }
        PageState::Failed { message, .. } => format!(
            r#"<div class="notice error" id="run-error">Error: {}</div>"#,
            escape_text(message)
        ),
        PageState::Done { report } => render_report(report),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Research Crew</title>
<style>{style}</style>
</head>
<body>
<h1>Conversational Research Crew</h1>
<p>Three chained LLM stages research a topic, condense the findings and write a Markdown report. Prompts are kept short to respect provider token quotas.</p>
<form method="post" action="/run" onsubmit="var b=this.querySelector('button');b.disabled=true;b.textContent='Running crew…';">
<input type="text" name="topic" value="{topic}" placeholder="e.g., Impact of AI on rural healthcare in India" required>
<button type="submit">Run Research Crew</button>
</form>
{body}
<hr>
<small>Tip: keep topics specific for best results.</small>
</body>
</html>
"#,
        style = STYLE,
        topic = escape_text(topic),
        body = body,
    )
}

fn render_report(report: &Report) -> String {
    format!(
        r#"<section class="report">
<h2>Final Report</h2>
<p><a id="download" download="{file_name}" href="{href}">Download Markdown</a></p>
<article id="rendered">
{rendered}</article>
<h3>Markdown</h3>
{raw}</section>"#,
        file_name = escape_text(&report.file_name()),
        href = escape_url(&download_href(&report.markdown)),
        rendered = render_markdown(&report.markdown),
        raw = render_raw(&report.markdown),
    )
}

/// Data URI carrying the exact report bytes.
pub fn download_href(markdown: &str) -> String {
    format!(
        "data:text/markdown;charset=utf-8;base64,{}",
        STANDARD.encode(markdown.as_bytes())
    )
}

/// Markdown to HTML. Raw HTML from the model is shown as text, and link or
/// image targets outside http(s), mailto and relative URLs become `#`.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn render_raw(markdown: &str) -> String {
    let lang = CowStr::Borrowed("markdown");
    let events = [
        Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))),
        Event::Text(CowStr::Borrowed(markdown)),
        Event::End(TagEnd::CodeBlock),
    ];

    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

fn safe_dest(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&dest) {
        dest
    } else {
        CowStr::Borrowed("#")
    }
}

fn is_safe_url(url: &str) -> bool {
    match url.find([':', '/', '?', '#']) {
        Some(i) if url[i..].starts_with(':') => {
            let scheme = url[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        // No scheme: relative reference.
        _ => true,
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html(&mut out, text).unwrap_or_default();
    out
}

fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    escape_href(&mut out, url).unwrap_or_default();
    out
}
