use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use docinsight::pipeline::Pipeline;
use docinsight::store::{DocumentMeta, DocumentStore, MemoryDocumentStore};
use docinsight::{
    load_config, Config, ExtractionError, Job, PipelineConfig, ProcessingStatus, WorkerPool,
};

#[derive(Parser)]
#[command(name = "docinsight")]
#[command(about = "Extract text from documents and analyze it")]
#[command(version)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one or more documents and print the results as JSON
    Process {
        /// Files to process
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// MIME type to use for every file instead of guessing from the extension
        #[arg(long)]
        mime: Option<String>,
    },
    /// Show which OCR and analysis modes are active
    Health,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(&config.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Process { files, mime } => process(&config, &files, mime),
        Commands::Health => health(&config),
    }
}

fn init_logging(default_level: &str, json: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        tracing::subscriber::set_global_default(subscriber)?;
    }

    // Worker pool and store log through the `log` facade.
    tracing_log::LogTracer::init()?;
    Ok(())
}

fn process(config: &Config, files: &[PathBuf], mime: Option<String>) -> Result<ExitCode> {
    let pipeline_config =
        Arc::new(PipelineConfig::from_config(config).context("Failed to resolve settings")?);
    let store = MemoryDocumentStore::new(config.max_file_size);

    let mut outputs = Vec::new();
    let mut submitted = Vec::new();

    for path in files {
        match register(&store, path, mime.clone()) {
            Ok((id, job)) => submitted.push((id, job)),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                outputs.push(json!({
                    "file": path.display().to_string(),
                    "error": e.to_string(),
                }));
            }
        }
    }

    let mut all_completed = outputs.is_empty();

    if !submitted.is_empty() {
        let worker_count = config.worker_count.min(submitted.len());
        let pool = WorkerPool::new(pipeline_config, worker_count)?;
        let expected = submitted.len();

        for (id, job) in submitted {
            store.mark_processing(&id)?;
            pool.submit(job)?;
        }

        for _ in 0..expected {
            let result = pool
                .recv_result()
                .context("Worker pool stopped before all documents finished")?;
            let document = store.apply_record(&result.document_id, &result.record)?;
            if document.status != ProcessingStatus::Completed {
                all_completed = false;
            }
            info!("{} finished as {}", document.filename, document.status);

            let results = document.results();
            outputs.push(json!({
                "document": document,
                "results": results,
                "steps_completed": result.record.steps_completed(),
            }));
        }

        pool.shutdown();
        pool.wait();
    }

    println!("{}", serde_json::to_string_pretty(&outputs)?);

    Ok(if all_completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn register(
    store: &MemoryDocumentStore,
    path: &Path,
    mime: Option<String>,
) -> docinsight::Result<(String, Job)> {
    let meta = DocumentMeta::from_path(path.to_path_buf(), mime).map_err(|source| {
        ExtractionError::ReadDocument {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let document = store.register(meta)?;
    let job = Job::for_document(
        &document.id,
        document.file_path.clone(),
        Some(document.mime_type.clone()),
    );
    Ok((document.id, job))
}

fn health(config: &Config) -> Result<ExitCode> {
    let pipeline_config = PipelineConfig::from_config(config).context("Failed to resolve settings")?;
    let pipeline = Pipeline::from_config(&pipeline_config);

    let analysis = if pipeline.analysis_mode() == "remote" {
        "remote"
    } else {
        "fallback_mode"
    };
    let ocr = if pipeline.ocr_available() {
        "tesseract"
    } else {
        "disabled"
    };

    let report = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "ocr": ocr,
        "analysis": analysis,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(ExitCode::SUCCESS)
}
