//! Conversion result types.

use serde::{Deserialize, Serialize};

/// The result of converting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutput {
    /// Cleaned Markdown.
    pub markdown: String,
    /// Heuristically extracted title; empty when nothing looked like one.
    pub title: String,
    /// Number of `![` image markers in `markdown`.
    pub image_count: usize,
    /// Timing and size diagnostics.
    pub stats: ConversionStats,
}

/// Size and timing figures for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    /// Size of the decoded document in bytes.
    pub input_bytes: usize,
    /// Characters produced by the converter, before cleanup.
    pub raw_markdown_chars: usize,
    /// Characters in the final Markdown.
    pub markdown_chars: usize,
    /// Wall-clock time spent converting and cleaning.
    pub duration_ms: u64,
}

/// Count Markdown image markers.
pub fn count_images(markdown: &str) -> usize {
    markdown.matches("![").count()
}
