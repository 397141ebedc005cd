use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use ledgerlift_core::{format_money, Document, ExtractionEnvelope, ExtractorConfig, TransactionRow};
use ledgerlift_finance::{reconcile, write_rows, write_rows_to_path};
use ledgerlift_ingest::Dispatcher;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "ledgerlift",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("LEDGERLIFT_BUILD_SHA"), ")"),
    about = "Recover transaction tables from word-positioned bank statements"
)]
struct Cli {
    /// Extractor config (default: ~/.ledgerlift/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transaction rows from one or more JSON word dumps
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the detected layout of each word dump
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Check running balances of an extraction (envelope JSON or word dump)
    Reconcile {
        file: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extractor configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config (to --config or ~/.ledgerlift/config.toml)
    Init,
    /// Print the effective config
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract { files, out, format } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let envelopes = extract_all(files, cfg.clone()).await?;
            emit(&envelopes, out.as_deref(), format, cfg.statement_year)?;
        }

        Command::Classify { files } => {
            let dispatcher = Dispatcher::new(config::load_config(cli.config.as_deref())?);
            for path in &files {
                let doc = load_document(path)?;
                println!("{}\t{}", path.display(), dispatcher.classify(&doc));
            }
        }

        Command::Reconcile { file, json } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let envelope = load_envelope(&file, cfg)?;
            let report = reconcile(&envelope.rows);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}: {} rows, charges {}, credits {}, {} balances checked",
                    envelope.source_id,
                    report.rows,
                    format_money(report.total_charges),
                    format_money(report.total_credits),
                    report.checked
                );
                for b in &report.breaks {
                    println!(
                        "  break at row {} (page {}, {}): expected {}, printed {}, off by {}",
                        b.index,
                        b.page,
                        b.oper_date,
                        format_money(b.expected),
                        format_money(b.printed),
                        format_money(b.difference())
                    );
                }
            }
            if !report.is_balanced() {
                bail!("{} balance break(s) in {}", report.breaks.len(), file.display());
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                config::init_config(cli.config.as_deref())?;
            }
            ConfigCommand::Show => {
                let cfg = config::load_config(cli.config.as_deref())?;
                print!("{}", cfg.to_toml()?);
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(path: &Path) -> Result<Document> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut doc = Document::from_json(&s).with_context(|| format!("decode {}", path.display()))?;
    if doc.source_id.trim().is_empty() {
        doc.source_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(doc)
}

/// An envelope written by `extract`, or a word dump extracted on the fly.
fn load_envelope(path: &Path, cfg: ExtractorConfig) -> Result<ExtractionEnvelope> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if let Ok(envelope) = serde_json::from_str::<ExtractionEnvelope>(&s) {
        return Ok(envelope);
    }
    let doc = load_document(path)?;
    Ok(Dispatcher::new(cfg).extract(&doc))
}

/// One blocking task per document; results keep the input order.
async fn extract_all(files: Vec<PathBuf>, cfg: ExtractorConfig) -> Result<Vec<ExtractionEnvelope>> {
    let dispatcher = Arc::new(Dispatcher::new(cfg));
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::task::spawn_blocking(move || -> Result<ExtractionEnvelope> {
                let doc = load_document(&path)?;
                let envelope = dispatcher.extract(&doc);
                info!(
                    file = %path.display(),
                    status = ?envelope.status,
                    rows = envelope.total_rows,
                    "extracted"
                );
                if !envelope.is_ok() {
                    warn!(file = %path.display(), status = ?envelope.status, "no rows extracted");
                }
                Ok(envelope)
            })
        })
        .collect();

    let mut envelopes = Vec::with_capacity(handles.len());
    for handle in handles {
        envelopes.push(handle.await.context("extraction task panicked")??);
    }
    Ok(envelopes)
}

fn emit(envelopes: &[ExtractionEnvelope], out: Option<&Path>, format: OutputFormat, year: Option<i32>) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = match envelopes {
                [single] => serde_json::to_string_pretty(single)?,
                many => serde_json::to_string_pretty(many)?,
            };
            match out {
                Some(p) => fs::write(p, json).with_context(|| format!("write {}", p.display()))?,
                None => println!("{json}"),
            }
        }
        OutputFormat::Csv => {
            let rows: Vec<TransactionRow> = envelopes.iter().flat_map(|e| e.rows.iter().cloned()).collect();
            match out {
                Some(p) => write_rows_to_path(p, &rows, year)?,
                None => write_rows(std::io::stdout().lock(), &rows, year)?,
            }
        }
    }
    Ok(())
}
