//! methex: clinical case-report extraction.
//! Entry point for the CLI binary.

mod io;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use methex_common::ExtractionConfig;
use methex_extract::{BatchSummary, ExtractionPipeline};
use methex_lexicon::LexiconStore;

#[derive(Parser)]
#[command(name = "methex", version, about = "Extract structured records from methemoglobinemia case reports")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to methex.toml.
    #[arg(short, long, env = "METHEX_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract one record per row of a documents CSV (`document_id`/`pmid`, `text`)
    Extract {
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Include evidence, route, timing and validation findings (JSON only)
        #[arg(long)]
        detailed: bool,

        /// Write batch statistics as JSON to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Print batch statistics for a records CSV
    Summarize {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Validate configuration and lexicon
    Check,

    /// Write the embedded lexicon as YAML, as a starting point for `lexicon_path`
    ExportLexicon {
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("methex=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { input, output, format, detailed, summary } => {
            let config = load_config(cli.config.as_deref())?;
            let mb_label = config.quality.methylene_blue_label.clone();
            let pipeline = ExtractionPipeline::from_config(config)?;

            let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
            let documents = io::read_documents(BufReader::new(file))?;
            info!("Processing {} documents from {}", documents.len(), input.display());

            let out = open_output(output.as_deref())?;
            let records = if detailed {
                if format != OutputFormat::Json {
                    warn!("--detailed implies JSON output");
                }
                let extractions = pipeline.process_batch_detailed(&documents);
                io::write_json(out, &extractions)?;
                extractions.into_iter().map(|e| e.record).collect()
            } else {
                let records = pipeline.process_batch(&documents);
                match format {
                    OutputFormat::Csv  => io::write_records_csv(out, &records)?,
                    OutputFormat::Json => io::write_json(out, &records)?,
                }
                records
            };

            let stats = BatchSummary::from_records(&records, &mb_label);
            info!(
                "Extracted {} records; meth_level found in {}, mean quality {:.2}",
                stats.total_records,
                stats.coverage.get("meth_level").copied().unwrap_or(0),
                stats.mean_quality_score.unwrap_or(0.0)
            );
            if let Some(path) = summary {
                let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                io::write_json(BufWriter::new(file), &stats)?;
                info!("Summary written to {}", path.display());
            }
        }

        Command::Summarize { input } => {
            let config = load_config(cli.config.as_deref())?;
            let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
            let records = io::read_records(BufReader::new(file))?;
            let stats = BatchSummary::from_records(&records, &config.quality.methylene_blue_label);
            io::write_json(std::io::stdout().lock(), &stats)?;
        }

        Command::Check => {
            let config = load_config(cli.config.as_deref())?;
            ExtractionPipeline::from_config(config)?;
            info!("Configuration and lexicon are valid");
        }

        Command::ExportLexicon { output } => {
            let path = output.to_string_lossy();
            LexiconStore::embedded().to_yaml(&path)?;
            info!("Embedded lexicon written to {}", path);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ExtractionConfig> {
    let config = match path {
        Some(p) => {
            let p = p.to_string_lossy();
            ExtractionConfig::from_path(&p).with_context(|| format!("loading config {p}"))?
        }
        None => ExtractionConfig::load()?,
    };
    Ok(config)
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let file = File::create(p).with_context(|| format!("creating {}", p.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    })
}
