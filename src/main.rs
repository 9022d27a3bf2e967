use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use personadigest::{
    config::{self, RunInput},
    embedding, extraction, logging,
    processing::{BoostTable, DigestService, RunRequest},
};

#[derive(Parser)]
#[command(
    name = "persona-digest",
    about = "Rank and summarize document sections for a persona and task"
)]
struct Cli {
    /// Directory holding the PDFs and input_config.json.
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Where to write the JSON report.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Number of top-ranked sections to report.
    #[arg(long)]
    top: Option<usize>,
    /// Maximum sentences per section summary.
    #[arg(long)]
    sentences: Option<usize>,
}

#[tokio::main]
async fn main() {
    logging::init_tracing();
    if let Err(err) = run(Cli::parse()).await {
        tracing::error!("Digest run failed: {err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = config::init_config().context("Failed to load configuration")?;
    if let Some(input_dir) = cli.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output) = cli.output {
        config.output_file = output;
    }
    if let Some(top) = cli.top {
        config.top_sections = top;
    }
    if let Some(sentences) = cli.sentences {
        config.summary_sentences = sentences;
    }

    let boosts = match &config.boost_table_path {
        Some(path) => BoostTable::from_file(path).context("Failed to load boost table")?,
        None => BoostTable::default(),
    };
    let client = embedding::load_embedding_client(&config)
        .await
        .context("Failed to load embedding model")?;

    let input = RunInput::load_or_default(&config.run_input_path());
    let documents = if input.documents.is_empty() {
        let discovered = extraction::discover_documents(&config.input_dir);
        tracing::info!(
            dir = %config.input_dir.display(),
            documents = discovered.len(),
            "No documents listed; discovered PDFs"
        );
        discovered
    } else {
        input.documents
    };

    let service = DigestService::from_config(&config, client, boosts);
    let report = service
        .run(&RunRequest {
            input_dir: config.input_dir.clone(),
            persona: input.persona,
            job: input.job,
            documents,
        })
        .await
        .context("Digest pipeline failed")?;
    report
        .write_report(&config.output_file)
        .with_context(|| format!("Failed to write {}", config.output_file.display()))?;

    let snapshot = service.metrics_snapshot();
    tracing::info!(
        metrics = %serde_json::to_string(&snapshot).unwrap_or_default(),
        "Run metrics"
    );
    Ok(())
}
