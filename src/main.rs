//! # imgrab
//!
//! Lists, and optionally fetches, every distinct raster image embedded in a
//! design document exported as JSON.
//!
//! ```bash
//! # List every image in the document
//! imgrab scan design.json
//!
//! # Only look inside the "Hero" frame, and fetch what's found
//! imgrab fetch design.json --select Hero --format png
//! ```
//!
//! Image files are looked up relative to the document's directory, using the
//! document's `images` manifest.

mod report;

use crate::report::Printer;
use clap::{Parser, Subcommand};
use imgrab_config::Config;
use imgrab_document::host::LocalHost;
use imgrab_document::{Document, HostHandle, NodeId};
use imgrab_engine::protocol::Inbound;
use imgrab_engine::{ScanMode, Session};
use miette::{IntoDiagnostic, WrapErr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "imgrab", about = "Find, deduplicate and fetch embedded images from a design document")]
#[command(version)]
struct Cli {
    /// Path to a config file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging; repeat for more still
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every distinct image in a document
    Scan {
        /// Document JSON file
        document: PathBuf,

        /// Only scan layers with this name (repeatable)
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,
    },

    /// Scan a document, then fetch every image found
    Fetch {
        /// Document JSON file
        document: PathBuf,

        /// Only scan layers with this name (repeatable)
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,

        /// Requested output format (repeatable)
        #[arg(long = "format", value_name = "FORMAT")]
        formats: Vec<String>,

        /// Rename pattern, passed through to the download request
        #[arg(long)]
        rename: Option<String>,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).map_err(|err| miette::miette!("{err:?}"))?;
    match cli.command {
        Command::Scan { document, select } => run(&document, &select, None, config).await,
        Command::Fetch {
            document,
            select,
            formats,
            rename,
        } => {
            let download = Inbound::StartDownload {
                images: Vec::new(),
                download_type: "files".to_string(),
                formats,
                rename_pattern: rename,
            };
            run(&document, &select, Some(download), config).await
        },
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Scan, then fetch if `download` is given, printing as events arrive.
async fn run(path: &Path, select: &[String], download: Option<Inbound>, config: Config) -> miette::Result<()> {
    let (document, host) = open(path).await?;
    let selection = resolve_selection(&document, select, path)?;

    let (outbound, received) = unbounded_channel();
    let printer = tokio::spawn(Printer::default().run(received));
    let session = Session::new(document, host, config, outbound);
    // This process is the presentation layer, and it's listening already.
    session.mark_ready();

    let interrupt = Arc::downgrade(&session);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok()
            && let Some(session) = interrupt.upgrade()
        {
            session.shutdown();
        }
    });

    let mode = match selection.is_empty() {
        true => ScanMode::All,
        false => {
            session.set_selection(selection).await;
            ScanMode::SelectionOnly
        },
    };
    session.dispatch(Inbound::StartScan { mode }).await;

    if let Some(Inbound::StartDownload {
        download_type,
        formats,
        rename_pattern,
        ..
    }) = download
    {
        let images = session.discovered().await.to_vec();
        if images.is_empty() {
            tracing::info!("Nothing to fetch");
        } else {
            session
                .dispatch(Inbound::StartDownload {
                    images,
                    download_type,
                    formats,
                    rename_pattern,
                })
                .await;
        }
    }

    ctrl_c.abort();
    // Dropping the last session closes the outbound channel.
    drop(session);
    let summary = printer.await.into_diagnostic().wrap_err("output task failed")?;
    summary.finish()
}

async fn open(path: &Path) -> miette::Result<(Arc<Document>, HostHandle)> {
    let json = tokio::fs::read_to_string(path)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("could not read {}", path.display()))?;
    let document = Document::from_json(&json).map_err(|err| miette::miette!("{err:?}"))?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let host = LocalHost::for_document(name, root, &document).map_err(|err| miette::miette!("{err:?}"))?;
    tracing::info!(path = %path.display(), nodes = document.len(), images = document.images().len(), "Document loaded");
    Ok((Arc::new(document), Arc::new(host)))
}

fn resolve_selection(document: &Document, names: &[String], path: &Path) -> miette::Result<Vec<NodeId>> {
    let mut selection = Vec::new();
    for name in names {
        let found = document.find_by_name(name);
        if found.is_empty() {
            miette::bail!("no layer named {name:?} in {}", path.display());
        }
        selection.extend(found);
    }
    Ok(selection)
}
