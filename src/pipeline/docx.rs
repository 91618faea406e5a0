//! Document conversion: DOCX bytes → raw Markdown.
//!
//! The service treats conversion as a capability behind the
//! [`DocumentConverter`] trait so the HTTP layer and tests never depend on a
//! particular library. [`DocxConverter`] is the production implementation:
//! `docx-rs` unpacks the ZIP container and parses the WordprocessingML into
//! a typed tree, and this module only walks that tree to emit Markdown.
//!
//! ## What is rendered
//!
//! | Word construct | Markdown |
//! |----------------|----------|
//! | `Title`, `Heading1`…`Heading6` styles | `#`…`######` headings (`Subtitle` → `##`) |
//! | bold / italic runs | `**…**` / `*…*` |
//! | hyperlinks | `[text](url)` or `[text](#bookmark)` |
//! | numbered / bulleted paragraphs | `- item` |
//! | tables | GFM pipe tables, first row as header |
//! | inline drawings | `![Image N](media/imageN)` placeholders |
//!
//! Everything else (comments, fields, tracked deletions) is dropped. The
//! output is deliberately raw; [`crate::pipeline::postprocess`] cleans it.

use crate::error::Docx2MdError;
use docx_rs::{
    read_docx, DocumentChild, HyperlinkData, Paragraph, ParagraphChild, Run, RunChild, Table,
    TableCellContent, TableChild, TableRowChild,
};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Local-file-header magic every ZIP (and so every DOCX) starts with.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Format hint passed to a [`DocumentConverter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Office Open XML word-processing document.
    Docx,
}

impl DocumentFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
        }
    }

    /// IANA media type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Converts a binary document into Markdown text.
///
/// Implementations must be pure with respect to the input: no shared mutable
/// state, so one instance can serve concurrent requests.
pub trait DocumentConverter: Send + Sync {
    /// Convert `bytes`, declared to be of `format`, to Markdown.
    ///
    /// Returns [`Docx2MdError::Conversion`] when the bytes are not a valid
    /// document of that format.
    fn convert(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, Docx2MdError>;
}

/// [`DocumentConverter`] backed by the `docx-rs` reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxConverter;

impl DocxConverter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentConverter for DocxConverter {
    fn convert(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, Docx2MdError> {
        if bytes.len() < ZIP_MAGIC.len() || &bytes[..ZIP_MAGIC.len()] != ZIP_MAGIC {
            let head = &bytes[..bytes.len().min(4)];
            return Err(Docx2MdError::Conversion(format!(
                "input is not a {} document ({}); first bytes: {:02x?}",
                format,
                format.mime_type(),
                head
            )));
        }

        let docx = read_docx(bytes).map_err(|e| Docx2MdError::Conversion(e.to_string()))?;

        // The reader leaves `HyperlinkData::External::path` empty; targets
        // live in the relationship table keyed by rid.
        let mut renderer = MarkdownRenderer {
            links: docx
                .hyperlinks
                .iter()
                .map(|(rid, path, _mode)| (rid.clone(), path.clone()))
                .collect(),
            ..MarkdownRenderer::default()
        };
        let mut blocks: Vec<String> = Vec::new();
        for child in &docx.document.children {
            let block = match child {
                DocumentChild::Paragraph(p) => renderer.paragraph(p),
                DocumentChild::Table(t) => renderer.table(t),
                _ => None,
            };
            blocks.extend(block);
        }

        debug!(
            "docx-rs: {} top-level elements → {} Markdown blocks, {} images",
            docx.document.children.len(),
            blocks.len(),
            renderer.images
        );

        Ok(join_blocks(&blocks))
    }
}

/// Join blocks with a blank line, keeping consecutive list items tight.
fn join_blocks(blocks: &[String]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            let tight = block.starts_with("- ") && blocks[i - 1].starts_with("- ");
            out.push_str(if tight { "\n" } else { "\n\n" });
        }
        out.push_str(block);
    }
    out
}

// ── Tree walking ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MarkdownRenderer {
    /// Images seen so far, used to number placeholders.
    images: usize,
    /// External hyperlink targets by relationship id.
    links: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Emphasis {
    bold: bool,
    italic: bool,
}

impl Emphasis {
    fn of(run: &Run) -> Self {
        Self {
            bold: run.run_property.bold.is_some(),
            italic: run.run_property.italic.is_some(),
        }
    }

    fn marker(&self) -> &'static str {
        match (self.bold, self.italic) {
            (false, false) => "",
            (true, false) => "**",
            (false, true) => "*",
            (true, true) => "***",
        }
    }
}

/// A piece of inline content before emphasis markers are applied.
enum Inline {
    Text(Emphasis, String),
    Raw(String),
}

impl MarkdownRenderer {
    fn paragraph(&mut self, p: &Paragraph) -> Option<String> {
        let text = self.inline(&p.children);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(level) = heading_level(p) {
            // Headings are single-line in Markdown.
            let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
            return Some(format!("{} {}", "#".repeat(level), flat));
        }
        if p.property.numbering_property.is_some() {
            return Some(format!("- {}", text));
        }
        Some(text.to_string())
    }

    fn inline(&mut self, children: &[ParagraphChild]) -> String {
        let mut parts: Vec<Inline> = Vec::new();
        self.collect_inline(children, &mut parts);
        render_inline(parts)
    }

    fn collect_inline(&mut self, children: &[ParagraphChild], parts: &mut Vec<Inline>) {
        for child in children {
            match child {
                ParagraphChild::Run(run) => self.collect_run(run, parts),
                ParagraphChild::Hyperlink(link) => {
                    let label = self.inline(&link.children);
                    let target = match &link.link {
                        HyperlinkData::External { rid, path } if path.is_empty() => {
                            self.links.get(rid).cloned().unwrap_or_default()
                        }
                        HyperlinkData::External { path, .. } => path.clone(),
                        HyperlinkData::Anchor { anchor } => format!("#{}", anchor),
                    };
                    if target.is_empty() || target == "#" {
                        parts.push(Inline::Raw(label));
                    } else {
                        parts.push(Inline::Raw(format!("[{}]({})", label.trim(), target)));
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_run(&mut self, run: &Run, parts: &mut Vec<Inline>) {
        let emphasis = Emphasis::of(run);
        let mut text = String::new();
        for child in &run.children {
            match child {
                RunChild::Text(t) => text.push_str(&t.text),
                RunChild::Tab(_) => text.push(' '),
                RunChild::Break(_) => text.push('\n'),
                RunChild::Drawing(_) => {
                    if !text.is_empty() {
                        parts.push(Inline::Text(emphasis, std::mem::take(&mut text)));
                    }
                    self.images += 1;
                    parts.push(Inline::Raw(format!(
                        "![Image {n}](media/image{n})",
                        n = self.images
                    )));
                }
                _ => {}
            }
        }
        if !text.is_empty() {
            parts.push(Inline::Text(emphasis, text));
        }
    }

    fn table(&mut self, table: &Table) -> Option<String> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for row in &table.rows {
            let TableChild::TableRow(row) = row;
            let mut cells = Vec::new();
            for cell in &row.cells {
                let TableRowChild::TableCell(cell) = cell;
                let mut texts = Vec::new();
                for content in &cell.children {
                    if let TableCellContent::Paragraph(p) = content {
                        let t = self.inline(&p.children);
                        if !t.trim().is_empty() {
                            texts.push(t.trim().to_string());
                        }
                    }
                }
                cells.push(table_cell_text(&texts.join(" ")));
            }
            rows.push(cells);
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 || rows.iter().all(|r| r.iter().all(String::is_empty)) {
            return None;
        }

        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (i, mut row) in rows.into_iter().enumerate() {
            row.resize(columns, String::new());
            lines.push(format!("| {} |", row.join(" | ")));
            if i == 0 {
                let sep: Vec<&str> = std::iter::repeat_n("---", columns).collect();
                lines.push(format!("| {} |", sep.join(" | ")));
            }
        }
        Some(lines.join("\n"))
    }
}

/// Merge adjacent runs with the same emphasis, then apply markers.
fn render_inline(parts: Vec<Inline>) -> String {
    let mut merged: Vec<Inline> = Vec::with_capacity(parts.len());
    for part in parts {
        if let Inline::Text(em, text) = &part {
            if let Some(Inline::Text(prev_em, prev)) = merged.last_mut() {
                if *prev_em == *em {
                    prev.push_str(text);
                    continue;
                }
            }
        }
        merged.push(part);
    }

    let mut out = String::new();
    for part in merged {
        match part {
            Inline::Text(em, text) => out.push_str(&wrap_emphasis(&text, em.marker())),
            Inline::Raw(raw) => out.push_str(&raw),
        }
    }
    out
}

/// `" bold "` + `**` → `" **bold** "`: markers hug the text, spaces stay outside.
fn wrap_emphasis(text: &str, marker: &str) -> String {
    let inner = text.trim();
    if marker.is_empty() || inner.is_empty() {
        return text.to_string();
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];
    format!("{lead}{marker}{inner}{marker}{trail}")
}

fn table_cell_text(text: &str) -> String {
    text.replace('\n', " ").replace('|', "\\|")
}

/// Map a paragraph style id to a heading level.
fn heading_level(p: &Paragraph) -> Option<usize> {
    let style = p.property.style.as_ref()?;
    let id: String = style
        .val
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    match id.as_str() {
        "title" => Some(1),
        "subtitle" => Some(2),
        _ => id
            .strip_prefix("heading")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| (1..=6).contains(n)),
    }
}
