//! Conversion entry points.
//!
//! [`convert_bytes`] is the core: converter → cleaner → title extractor →
//! image count. [`convert_base64`] adds payload decoding in front of it and
//! is what the HTTP handler calls.
//!
//! Converters are synchronous and CPU-bound, so both functions move the
//! converter call onto tokio's blocking pool; a panic inside the converter
//! surfaces as [`Docx2MdError::Unknown`] instead of tearing down the worker.

use crate::config::ConversionConfig;
use crate::error::Docx2MdError;
use crate::output::{count_images, ConversionOutput, ConversionStats};
use crate::pipeline::docx::{DocumentConverter, DocumentFormat};
use crate::pipeline::{decode, postprocess, title};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a base64-encoded DOCX payload to Markdown.
pub async fn convert_base64(
    payload: &str,
    converter: Arc<dyn DocumentConverter>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Docx2MdError> {
    let bytes = decode::decode_payload(payload)?;
    convert_bytes(bytes, converter, config).await
}

/// Convert DOCX bytes to Markdown.
///
/// # Errors
/// - [`Docx2MdError::Conversion`] if the converter rejects the bytes
/// - [`Docx2MdError::Unknown`] if the converter task panicked
pub async fn convert_bytes(
    bytes: Vec<u8>,
    converter: Arc<dyn DocumentConverter>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Docx2MdError> {
    let start = Instant::now();
    let input_bytes = bytes.len();
    info!("Starting conversion: {} bytes", input_bytes);

    // ── Step 1: External converter ───────────────────────────────────────
    let raw = tokio::task::spawn_blocking(move || converter.convert(&bytes, DocumentFormat::Docx))
        .await
        .map_err(|e| Docx2MdError::Unknown(format!("converter task failed: {e}")))??;
    debug!("Converter produced {} chars", raw.len());

    // ── Step 2: Clean up + extract title ─────────────────────────────────
    let output = finish(&raw, config);

    let stats = ConversionStats {
        input_bytes,
        raw_markdown_chars: raw.chars().count(),
        markdown_chars: output.markdown.chars().count(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} chars, title {:?}, {} images, {}ms",
        stats.markdown_chars,
        output.title,
        output.image_count,
        stats.duration_ms
    );

    Ok(ConversionOutput { stats, ..output })
}

/// Post-converter steps; pure and synchronous.
fn finish(raw: &str, config: &ConversionConfig) -> ConversionOutput {
    let mut markdown = postprocess::clean_markdown(raw);
    let found = title::find_title(&markdown, config.title_scan_lines);

    if config.strip_title_line {
        if let Some(ref m) = found {
            markdown = markdown
                .lines()
                .skip(m.line_index + 1)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string();
        }
    }

    let image_count = count_images(&markdown);
    ConversionOutput {
        markdown,
        title: found.map(|m| m.title).unwrap_or_default(),
        image_count,
        stats: ConversionStats::default(),
    }
}
