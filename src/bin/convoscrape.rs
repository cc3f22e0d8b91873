//! Command-line exporter for shared ChatGPT conversations.
//!
//! Validates the share URL, runs the two-phase extraction pipeline, and
//! writes the requested export formats into the output directory under
//! timestamped file names.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use convoscrape::{browser, export, Conversation, HttpSource, Options, ShareUrl};

#[derive(Debug, Parser)]
#[command(
    name = "convoscrape",
    version,
    about = "Extract and export a shared ChatGPT conversation"
)]
struct Cli {
    /// Share URL (https://chatgpt.com/share/<id>)
    url: String,

    /// Export format; repeat the flag for multiple formats
    #[arg(short, long, value_enum, default_values_t = vec![Format::Json])]
    format: Vec<Format>,

    /// Output directory for export files
    #[arg(short, long, default_value = "exports")]
    out: PathBuf,

    /// Never escalate to a headless browser for extraction
    #[arg(long)]
    static_only: bool,

    /// Override the fetch and navigation timeouts, in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Html,
    Pdf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut options = Options {
        static_only: cli.static_only,
        ..Options::default()
    };
    if let Some(secs) = cli.timeout {
        options.fetch_timeout = Duration::from_secs(secs);
        options.navigation_timeout = Duration::from_secs(secs);
    }

    let url = ShareUrl::parse(&cli.url)?;
    let source = HttpSource::new(&options)?;

    info!(url = %url, "extracting conversation");
    let conversation = convoscrape::parse_share(&source, &url, &options).await?;
    info!(
        messages = conversation.messages.len(),
        title = conversation.title.as_deref().unwrap_or("(untitled)"),
        "extraction complete"
    );

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating output directory {}", cli.out.display()))?;

    for format in unique(cli.format) {
        write_export(format, &conversation, &url, &cli.out, &options).await?;
    }

    Ok(())
}

async fn write_export(
    format: Format,
    conversation: &Conversation,
    url: &ShareUrl,
    out: &Path,
    options: &Options,
) -> anyhow::Result<()> {
    let file_id = url.file_id();
    let path = match format {
        Format::Csv => {
            let path = out.join(export::timestamped_name(&file_id, "csv"));
            std::fs::write(&path, export::csv::render(&conversation.messages))?;
            path
        }
        Format::Json => {
            let path = out.join(export::timestamped_name(&file_id, "json"));
            std::fs::write(&path, export::json::render(conversation)?)?;
            path
        }
        Format::Html => {
            let path = out.join(export::timestamped_name(&file_id, "html"));
            std::fs::write(&path, export::document::render_html(conversation))?;
            path
        }
        Format::Pdf => {
            let page = export::document::render_html(conversation);
            let bytes = browser::print_pdf(&page, options)
                .await
                .context("printing the conversation to PDF")?;
            let path = out.join(export::timestamped_name(&file_id, "pdf"));
            std::fs::write(&path, bytes)?;
            path
        }
    };

    info!(path = %path.display(), "export written");
    Ok(())
}

/// First-occurrence order, duplicates dropped.
fn unique(formats: Vec<Format>) -> Vec<Format> {
    let mut kept = Vec::with_capacity(formats.len());
    for format in formats {
        if !kept.contains(&format) {
            kept.push(format);
        }
    }
    kept
}
