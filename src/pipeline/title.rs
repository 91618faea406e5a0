//! Title extraction: pick a likely document title from cleaned Markdown.
//!
//! This is a first-match heuristic over the first few lines, not a search
//! for the best candidate. A level-1 heading wins outright; otherwise the
//! first short, non-sentence line does.

use tracing::debug;

/// Default number of leading lines to scan.
pub const DEFAULT_TITLE_SCAN_LINES: usize = 10;

/// The wider window some deployments used.
pub const EXTENDED_TITLE_SCAN_LINES: usize = 15;

/// Upper bound accepted by [`crate::ConversionConfigBuilder::title_scan_lines`].
pub const MAX_TITLE_SCAN_LINES: usize = 100;

const MIN_TITLE_WORDS: usize = 2;
const MAX_TITLE_WORDS: usize = 10;
const MAX_TITLE_CHARS: usize = 100;

/// A title and the zero-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub title: String,
    pub line_index: usize,
}

/// Extract a title from the first `window` lines, or `""` if none qualifies.
pub fn extract_title(markdown: &str, window: usize) -> String {
    find_title(markdown, window)
        .map(|m| m.title)
        .unwrap_or_default()
}

/// Like [`extract_title`], but also reports where the title was found.
pub fn find_title(markdown: &str, window: usize) -> Option<TitleMatch> {
    for (line_index, line) in markdown.lines().take(window).enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(text) = trimmed.strip_prefix("# ") {
            let title = text.trim().to_string();
            debug!("Title from H1 on line {}: {:?}", line_index + 1, title);
            return Some(TitleMatch { title, line_index });
        }

        // Lower-level headings are section titles, not the document title.
        if trimmed.starts_with('#') {
            continue;
        }

        // Leftover TOC headers ("Table of content", "Contents:").
        if trimmed.to_lowercase().contains("content") {
            continue;
        }

        if looks_like_title(trimmed) {
            let title = strip_emphasis(trimmed);
            debug!("Title from text on line {}: {:?}", line_index + 1, title);
            return Some(TitleMatch { title, line_index });
        }
    }

    debug!("No title found in first {} lines", window);
    None
}

/// 2–10 words, under 100 characters, and not a sentence.
fn looks_like_title(line: &str) -> bool {
    let words = line.split_whitespace().count();
    (MIN_TITLE_WORDS..=MAX_TITLE_WORDS).contains(&words)
        && line.chars().count() < MAX_TITLE_CHARS
        && !line.ends_with('.')
}

fn strip_emphasis(line: &str) -> String {
    line.replace('*', "").trim().trim_matches('_').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h1_heading_wins() {
        assert_eq!(
            extract_title("# My Document Title\n\nSome body text.", DEFAULT_TITLE_SCAN_LINES),
            "My Document Title"
        );
    }

    #[test]
    fn first_match_wins_over_later_h1() {
        let md = "Quarterly Sales Report\n# Heading One";
        assert_eq!(extract_title(md, 10), "Quarterly Sales Report");
    }

    #[test]
    fn no_qualifying_line_returns_empty() {
        let md = "Hello\n\nThis is a sentence.\nWorld\nAnother full sentence here.";
        assert_eq!(extract_title(md, 10), "");
    }

    #[test]
    fn skips_lines_mentioning_content() {
        assert_eq!(
            extract_title("Table of content\nShort Report Name\n", 10),
            "Short Report Name"
        );
    }

    #[test]
    fn skips_lower_level_headings() {
        let md = "## Section Heading Here\nProject Kickoff Notes";
        assert_eq!(extract_title(md, 10), "Project Kickoff Notes");
    }

    #[test]
    fn strips_bold_and_italic_markers() {
        assert_eq!(extract_title("**Design Review Summary**", 10), "Design Review Summary");
        assert_eq!(extract_title("*Draft Proposal*", 10), "Draft Proposal");
        assert_eq!(extract_title("_Meeting Minutes_", 10), "Meeting Minutes");
    }

    #[test]
    fn rejects_too_many_words() {
        let md = "one two three four five six seven eight nine ten eleven";
        assert_eq!(extract_title(md, 10), "");
    }

    #[test]
    fn rejects_long_lines() {
        let long = format!("{} {}", "a".repeat(60), "b".repeat(45));
        assert_eq!(extract_title(&long, 10), "");
    }

    #[test]
    fn window_limits_scan() {
        let mut md = String::new();
        for _ in 0..12 {
            md.push_str("Word\n");
        }
        md.push_str("Late Title Line\n");
        assert_eq!(extract_title(&md, DEFAULT_TITLE_SCAN_LINES), "");
        assert_eq!(extract_title(&md, EXTENDED_TITLE_SCAN_LINES), "Late Title Line");
    }

    #[test]
    fn reports_line_index() {
        let m = find_title("\n\nBudget Plan 2025\nbody", 10).unwrap();
        assert_eq!(m.title, "Budget Plan 2025");
        assert_eq!(m.line_index, 2);
    }

    #[test]
    fn empty_input() {
        assert_eq!(extract_title("", 10), "");
        assert!(find_title("", 10).is_none());
    }
}
