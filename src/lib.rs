//! Topic in, Markdown research report out.
//!
//! A fixed chain of three LLM stages (researcher, summarizer, report writer)
//! fed with a Wikipedia summary and a handful of scraped search links, served
//! through a single-page web UI or the command line.

pub mod agent;
pub mod config;
pub mod fetch;
pub mod instrumentation;
pub mod llm;
pub mod web;

pub use agent::{Crew, Report, RunError};
pub use config::Config;
