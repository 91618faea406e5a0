//! Pipeline stages for DOCX-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the converter can be swapped without touching the
//! text rules.
//!
//! ## Data Flow
//!
//! ```text
//! decode ──▶ docx ──▶ postprocess ──▶ title
//! (base64)  (docx-rs)  (cleanup)      (heuristic)
//! ```
//!
//! 1. [`decode`]: base64 request payload → bytes
//! 2. [`docx`]: bytes → raw Markdown via the [`docx::DocumentConverter`]
//!    capability; the only stage that touches the binary format
//! 3. [`postprocess`]: deterministic rules that strip TOC, page-number and
//!    emphasis artefacts
//! 4. [`title`]: first-match title heuristic over the leading lines

pub mod decode;
pub mod docx;
pub mod postprocess;
pub mod title;
