//! # edgequake-docx2md
//!
//! Convert Word (DOCX) documents to clean Markdown, served over HTTP
//! or run from the CLI or as a library.
//!
//! ## Why this crate?
//!
//! A Word file turned into Markdown by a plain converter is full of print
//! furniture: the generated table of contents with its anchor links and
//! dotted leaders, page numbers, "5 min read" banners, headings bolded by
//! hand. This crate delegates the binary parsing to `docx-rs` and owns only
//! the thin layer around it: payload decoding, Markdown cleanup, a title
//! heuristic, and the JSON envelope of the HTTP endpoint.
//!
//! ## Pipeline Overview
//!
//! ```text
//! {"docx": "<base64>"}
//!  │
//!  ├─ 1. Decode   base64 → bytes (whitespace, data-URI and padding tolerant)
//!  ├─ 2. Convert  docx-rs reader → raw Markdown (spawn_blocking)
//!  ├─ 3. Polish   9 ordered cleanup rules, re-applied until stable
//!  ├─ 4. Title    first H1, else first short non-sentence line
//!  └─ 5. Output   {success, markdown, title, imageCount}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_docx2md::{convert_bytes, ConversionConfig, DocxConverter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("report.docx")?;
//!     let output = convert_bytes(bytes, Arc::new(DocxConverter::new()), &ConversionConfig::default()).await?;
//!     println!("# {}\n\n{}", output.title, output.markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docx2md` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ServiceConfig};
pub use convert::{convert_base64, convert_bytes};
pub use error::Docx2MdError;
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::docx::{DocumentConverter, DocumentFormat, DocxConverter};
pub use pipeline::postprocess::clean_markdown;
pub use pipeline::title::extract_title;
pub use server::{build_router, serve, AppState};
