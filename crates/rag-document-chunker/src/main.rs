use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag_document_chunker::utils::logger::init_logger;
use rag_document_chunker::worker::{self, to_bulk_ndjson, DocumentProcessor};
use rag_document_chunker::{ProcessingContext, ProcessorFactory, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "rag-chunk",
    version,
    about = "Split documents into token-bounded chunks for search indexing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk a document in place and export the chunks as JSON
    Process {
        /// Source document (PDF)
        file: PathBuf,

        /// Url stored on every chunk; defaults to document.base_url + file name
        #[arg(long)]
        url: Option<String>,

        /// JSON output path; defaults to <file dir>/<file stem>.json
        #[arg(long)]
        output: Option<PathBuf>,

        /// Index name for bulk records; defaults to export.index_name
        #[arg(long, env = "APP_INDEX_NAME")]
        index: Option<String>,

        /// Also write a bulk NDJSON body to this path
        #[arg(long)]
        bulk: Option<PathBuf>,
    },
    /// Copy a document into the upload directory, chunk it, then remove the copy
    Ingest {
        /// Source document (PDF)
        file: PathBuf,

        #[arg(long)]
        url: Option<String>,

        #[arg(long, env = "APP_INDEX_NAME")]
        index: Option<String>,

        /// Bulk NDJSON output path; defaults to <stem>.ndjson in the export directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;

    fs::create_dir_all(&settings.logging.dir)?;
    init_logger(&settings.logging)?;

    info!("🚀 rag-chunk v{}", env!("CARGO_PKG_VERSION"));
    info!("Max tokens per chunk: {}", settings.chunking.max_tokens);

    let context = ProcessingContext::from_settings(&settings)?;
    let metrics = context.metrics.clone();

    match cli.command {
        Commands::Process {
            file,
            url,
            output,
            index,
            bulk,
        } => {
            let url = url.unwrap_or_else(|| settings.document_url(&file_name(&file)));
            let index = index.unwrap_or_else(|| settings.export.index_name.clone());

            let mut processor = ProcessorFactory::for_path(&file, &url, context)?;
            processor.process()?;

            let output = output.or_else(|| {
                settings
                    .export
                    .output_dir
                    .as_ref()
                    .map(|dir| dir.join(format!("{}.json", file_stem(&file))))
            });
            processor.export_chunked_document(output.as_deref())?;

            if let Some(bulk_path) = bulk {
                write_bulk(&*processor, &index, &bulk_path)?;
            }
        }
        Commands::Ingest {
            file,
            url,
            index,
            output,
        } => {
            let url = url.unwrap_or_else(|| settings.document_url(&file_name(&file)));
            let index = index.unwrap_or_else(|| settings.export.index_name.clone());

            let chunks = worker::ingest_upload(&settings.upload.dir, &file, &url, context)?;

            let output = output.unwrap_or_else(|| {
                let dir = settings
                    .export
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("."));
                dir.join(format!("{}.ndjson", file_stem(&file)))
            });

            match worker::format_data(&chunks, &index) {
                Some(records) => {
                    fs::write(&output, to_bulk_ndjson(&records)?)?;
                    info!("Wrote {} bulk records to {:?}", records.len(), output);
                }
                None => warn!("No chunks produced for {:?}", file),
            }
        }
    }

    metrics.log_summary();
    Ok(())
}

fn write_bulk(processor: &dyn DocumentProcessor, index: &str, path: &Path) -> Result<()> {
    match processor.format_data(index) {
        Some(records) => {
            fs::write(path, to_bulk_ndjson(&records)?)?;
            info!("Wrote {} bulk records to {:?}", records.len(), path);
        }
        None => warn!("No chunks to write as bulk records"),
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
