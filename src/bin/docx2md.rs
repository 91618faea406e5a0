//! CLI binary for edgequake-docx2md.
//!
//! `docx2md serve` runs the HTTP service; `docx2md convert` runs the same
//! pipeline on a local file. Flags fall back to environment variables.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_docx2md::config::{DEFAULT_BIND_ADDR, DEFAULT_MAX_BODY_BYTES};
use edgequake_docx2md::pipeline::title::DEFAULT_TITLE_SCAN_LINES;
use edgequake_docx2md::server::start_server;
use edgequake_docx2md::{convert_bytes, ConversionConfig, DocxConverter, ServiceConfig};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service
  AZURE_STORAGE_CONNECTION_STRING="UseDevelopmentStorage=true" docx2md serve

  # Listen on all interfaces, wider title window
  docx2md --title-lines 15 serve --bind 0.0.0.0:8080

  # Convert a local file to stdout
  docx2md convert report.docx

  # Convert to file, dropping the title line from the body
  docx2md --strip-title convert report.docx -o report.md

  # JSON output with title, image count and stats
  docx2md convert report.docx --json

  # Call the service
  curl -s localhost:7071/api/convertDocx \
    -H 'content-type: application/json' \
    -d "{\"docx\": \"$(base64 -w0 report.docx)\"}"

ENVIRONMENT VARIABLES:
  AZURE_STORAGE_CONNECTION_STRING  Storage connection string (required by serve)
  DOCX2MD_BIND                     Listen address (default 127.0.0.1:7071)
  DOCX2MD_MAX_BODY_BYTES           Request body limit (default 50 MiB)
  DOCX2MD_TITLE_LINES              Title scan window, 1-100 (default 10)
  DOCX2MD_STRIP_TITLE              Remove the title line from the Markdown
  RUST_LOG                         Overrides --verbose / --quiet
"#;

/// Convert Word (DOCX) documents to clean Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "docx2md",
    version,
    about = "Convert Word (DOCX) documents to clean Markdown",
    long_about = "Convert Word (DOCX) documents to clean Markdown, either as an HTTP service \
accepting base64 payloads or directly on local files. Table-of-contents residue, page numbers, \
reading-time banners and emphasised headings are cleaned up, and a title is extracted.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    conversion: ConversionArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCX2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCX2MD_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ConversionArgs {
    /// Number of leading lines searched for a title (1-100).
    #[arg(long, global = true, env = "DOCX2MD_TITLE_LINES", default_value_t = DEFAULT_TITLE_SCAN_LINES)]
    title_lines: usize,

    /// Remove the title line from the returned Markdown.
    #[arg(long, global = true, env = "DOCX2MD_STRIP_TITLE")]
    strip_title: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP conversion service.
    Serve {
        /// Socket address to listen on.
        #[arg(long, env = "DOCX2MD_BIND", default_value = DEFAULT_BIND_ADDR)]
        bind: SocketAddr,

        /// Storage connection string; conversions fail with 500 when unset.
        #[arg(long, env = "AZURE_STORAGE_CONNECTION_STRING", hide_env_values = true)]
        storage_connection_string: Option<String>,

        /// Largest accepted request body in bytes.
        #[arg(long, env = "DOCX2MD_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
        max_body_bytes: usize,
    },

    /// Convert a local DOCX file.
    Convert {
        /// Path to the .docx file.
        input: PathBuf,

        /// Write Markdown to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output structured JSON (ConversionOutput) instead of Markdown.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let conversion = ConversionConfig::builder()
        .title_scan_lines(cli.conversion.title_lines)
        .strip_title_line(cli.conversion.strip_title)
        .build()
        .context("Invalid configuration")?;

    match cli.command {
        Command::Serve {
            bind,
            storage_connection_string,
            max_body_bytes,
        } => {
            let config = ServiceConfig {
                bind_addr: bind,
                storage_connection_string,
                max_body_bytes,
                conversion,
            };
            start_server(config, Arc::new(DocxConverter::new()))
                .await
                .with_context(|| format!("HTTP server on {bind} failed"))?;
        }
        Command::Convert {
            input,
            output,
            json,
        } => run_convert(&input, output.as_deref(), json, cli.quiet, &conversion).await?,
    }

    Ok(())
}

async fn run_convert(
    input: &Path,
    output_path: Option<&Path>,
    json: bool,
    quiet: bool,
    config: &ConversionConfig,
) -> Result<()> {
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let output = convert_bytes(bytes, Arc::new(DocxConverter::new()), config)
        .await
        .context("Conversion failed")?;

    let rendered = if json {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")?
    } else {
        output.markdown.clone()
    };

    match output_path {
        Some(path) => {
            write_atomic(path, &rendered).await?;
            if !quiet {
                eprintln!(
                    "Converted {} -> {}  ({} chars, {} images, {}ms)",
                    input.display(),
                    path.display(),
                    output.stats.markdown_chars,
                    output.image_count,
                    output.stats.duration_ms,
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            if !rendered.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    if !quiet && !json && !output.title.is_empty() {
        eprintln!("Title: {}", output.title);
    }

    Ok(())
}

/// Write to a sibling temp file, then rename over the target.
async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, contents)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e).with_context(|| format!("Failed to move output to {}", path.display()));
    }
    Ok(())
}
