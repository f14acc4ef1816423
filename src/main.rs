use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use research_crew::instrumentation::RunLog;
use research_crew::{web, Config, Crew};

#[derive(Parser)]
#[command(name = "research-crew", about = "Three-stage LLM research crew with a web UI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the single-page research UI
    Serve {
        /// Address to bind (overrides BIND_ADDR)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Research one topic and print the report
    Run {
        /// The topic to research
        topic: String,
        /// Also write the report to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Research every topic in a JSONL file
    Batch {
        /// Path to JSONL file with {"topic": "..."} lines
        path: String,
        /// Directory receiving one report file per topic
        #[arg(long, default_value = "reports")]
        out_dir: PathBuf,
    },
}

#[derive(serde::Deserialize)]
struct BatchTopic {
    topic: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let crew = Crew::new(&config)?;

    match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or(config.bind_addr);
            web::serve(Arc::new(crew), addr).await?;
        }
        Commands::Run { topic, out } => {
            let (report, run_log) = crew.run(&topic).await?;
            println!("\n{}\n", report.markdown);
            if let Some(path) = out {
                write_report(&path, &report.markdown)?;
                eprintln!("Saved report to {}", path.display());
            }
            eprintln!("{}", run_log.summary());
        }
        Commands::Batch { path, out_dir } => {
            let file =
                std::fs::File::open(&path).context(format!("Failed to open topics file: {}", path))?;
            let reader = std::io::BufReader::new(file);
            std::fs::create_dir_all(&out_dir).context("Failed to create output directory")?;

            let mut run_logs: Vec<RunLog> = Vec::new();
            let mut errors = 0;

            for (i, line) in reader.lines().enumerate() {
                let line = line.context("Failed to read line")?;
                if line.trim().is_empty() {
                    continue;
                }

                let entry: BatchTopic =
                    serde_json::from_str(&line).context(format!("Failed to parse line {}", i + 1))?;

                eprintln!("\n[{}/...] {}", i + 1, entry.topic);

                match crew.run(&entry.topic).await {
                    Ok((report, run_log)) => {
                        let target = out_dir.join(format!("{:03}_{}", i + 1, report.file_name()));
                        write_report(&target, &report.markdown)?;
                        println!("  {} -> {}", run_log.summary(), target.display());
                        run_logs.push(run_log);
                    }
                    Err(e) => {
                        eprintln!("  ERROR: {}", e);
                        errors += 1;
                    }
                }
            }

            println!("\n=== Batch Summary ===");
            println!("Reports: {} (errors: {})", run_logs.len(), errors);

            if !run_logs.is_empty() {
                let avg_latency = run_logs.iter().map(|r| r.total_latency_ms).sum::<u64>() as f64
                    / run_logs.len() as f64;
                let total_tokens: u32 = run_logs.iter().map(|r| r.total_tokens()).sum();
                let total_cost: f64 = run_logs.iter().map(|r| r.cost()).sum();

                println!("Avg latency: {:.1}s", avg_latency / 1000.0);
                println!("Total tokens: {}", total_tokens);
                println!("Total cost: ${:.4}", total_cost);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Writes the report bytes verbatim.
fn write_report(path: &Path, markdown: &str) -> Result<()> {
    std::fs::write(path, markdown.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
