//! Post-processing: deterministic cleanup of converter-generated Markdown.
//!
//! Word documents carry a lot of print-oriented furniture that is noise once
//! the text is Markdown: a generated table of contents (heading, anchor
//! links into the document, dotted leader lines, page numbers), "5 min read"
//! banners pasted from blogs, and headings whose whole text was bolded in
//! Word. This module removes that furniture without touching content.
//!
//! ## Rule Order
//!
//! Rules run in a fixed order: line-removal rules leave empty lines behind,
//! so blank-line collapsing and the final trim must come last.
//!
//! ## Idempotence
//!
//! A removal can expose a new match for an earlier rule (deleting
//! "3 min read" from `"12 3 min read"` leaves a bare page number).
//! [`clean_markdown`] therefore re-applies the rule list until the text
//! stops changing. Every rule only ever deletes characters, so the loop is
//! bounded by the input length and usually ends after the second pass.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// Apply all post-processing rules to the converter output.
///
/// Rules (applied in order):
/// 1. Remove "Contents" / "Table of Contents" heading lines
/// 2. Remove links into the document itself (`[..](#anchor)`)
/// 3. Remove dotted / underscore leader lines
/// 4. Remove bare page numbers and "Page N" lines
/// 5. Remove "N min read" annotations
/// 6. Unwrap headings fully wrapped in bold or italic
/// 7. Remove empty links (`[](..)`)
/// 8. Collapse 3+ consecutive newlines to 2
/// 9. Trim the document
pub fn clean_markdown(input: &str) -> String {
    let mut current = apply_rules(input);
    let mut passes = 1;
    loop {
        let next = apply_rules(&current);
        if next == current {
            break;
        }
        current = next;
        passes += 1;
    }
    debug!(
        "Post-processing: {} → {} chars in {} passes",
        input.len(),
        current.len(),
        passes
    );
    current
}

/// One pass over the rule list.
fn apply_rules(input: &str) -> String {
    let s = remove_toc_headings(input);
    let s = remove_anchor_links(&s);
    let s = remove_leader_lines(&s);
    let s = remove_page_numbers(&s);
    let s = remove_read_time(&s);
    let s = unwrap_emphasised_headings(&s);
    let s = remove_empty_links(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

// ── Rule 1: TOC headings ─────────────────────────────────────────────────────

static RE_TOC_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*#{1,6}[ \t]*(?:table[ \t]+of[ \t]+)?contents[ \t]*$").unwrap()
});

fn remove_toc_headings(input: &str) -> String {
    RE_TOC_HEADING.replace_all(input, "").into_owned()
}

// ── Rule 2: In-document anchor links ─────────────────────────────────────────
//
// Word's generated TOC is a list of hyperlinks to `_Toc…` bookmarks. In a
// Markdown page those anchors no longer exist, so the whole link goes.

static RE_ANCHOR_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]\n]*\]\(#[^)\n]*\)").unwrap());

fn remove_anchor_links(input: &str) -> String {
    RE_ANCHOR_LINK.replace_all(input, "").into_owned()
}

// ── Rule 3: Leader lines ─────────────────────────────────────────────────────

static RE_LEADER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:\.{3,}|_{3,})[ \t]*$").unwrap());

fn remove_leader_lines(input: &str) -> String {
    RE_LEADER_LINE.replace_all(input, "").into_owned()
}

// ── Rule 4: Page numbers ─────────────────────────────────────────────────────

static RE_BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+[ \t]*$").unwrap());

static RE_PAGE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*page[ \t]+\d+.*$").unwrap());

fn remove_page_numbers(input: &str) -> String {
    let s = RE_BARE_NUMBER.replace_all(input, "");
    RE_PAGE_LINE.replace_all(&s, "").into_owned()
}

// ── Rule 5: Reading-time annotations ─────────────────────────────────────────

// Matched anywhere, including inside words and across a line break.
static RE_READ_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+\s*min(?:ute)?s?\s*read").unwrap());

fn remove_read_time(input: &str) -> String {
    RE_READ_TIME.replace_all(input, "").into_owned()
}

// ── Rule 6: Emphasised headings ──────────────────────────────────────────────
//
// `## **Overview**` → `## Overview`. Only headings whose entire text sits
// inside one emphasis span are touched; `# **A** and **B**` is left alone.

static RE_STAR_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]*\*{1,3}([^*\n]+)\*{1,3}[ \t]*$").unwrap());

static RE_UNDERSCORE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]*_{1,3}([^_\n]+)_{1,3}[ \t]*$").unwrap());

fn unwrap_emphasised_headings(input: &str) -> String {
    let unwrap = |caps: &Captures<'_>| format!("{} {}", &caps[1], caps[2].trim());
    let s = RE_STAR_HEADING.replace_all(input, unwrap);
    RE_UNDERSCORE_HEADING.replace_all(&s, unwrap).into_owned()
}

// ── Rule 7: Empty links ──────────────────────────────────────────────────────

static RE_EMPTY_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\]\([^)\n]*\)").unwrap());

fn remove_empty_links(input: &str) -> String {
    RE_EMPTY_LINK.replace_all(input, "").into_owned()
}

// ── Rule 8: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
