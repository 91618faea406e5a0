//! Configuration types for DOCX-to-Markdown conversion and the HTTP service.
//!
//! Two structs, two lifetimes:
//!
//! * [`ConversionConfig`]: per-conversion knobs (title window, title-line
//!   stripping). Built via [`ConversionConfigBuilder`]; shared by the HTTP
//!   handler and the `convert` CLI subcommand.
//! * [`ServiceConfig`]: process-wide settings read once at startup (bind
//!   address, storage connection string, body limit). Validated exactly once
//!   by [`ServiceConfig::validate`] when the server state is built.

use crate::error::{Docx2MdError, STORAGE_NOT_CONFIGURED};
use crate::pipeline::title::{DEFAULT_TITLE_SCAN_LINES, MAX_TITLE_SCAN_LINES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Configuration for a single DOCX-to-Markdown conversion.
///
/// # Example
/// ```rust
/// use edgequake_docx2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .title_scan_lines(15)
///     .strip_title_line(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.title_scan_lines, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// How many leading lines of the cleaned Markdown the title extractor
    /// looks at. Range: 1–100. Default: 10.
    ///
    /// The service historically ran with two different windows (10 and 15);
    /// 10 is the default, 15 is available as
    /// [`crate::pipeline::title::EXTENDED_TITLE_SCAN_LINES`].
    pub title_scan_lines: usize,

    /// Remove the title line (and anything above it) from the returned
    /// Markdown once the title has been extracted. Default: false.
    ///
    /// Useful when the caller renders the title separately and would
    /// otherwise show it twice.
    pub strip_title_line: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            title_scan_lines: DEFAULT_TITLE_SCAN_LINES,
            strip_title_line: false,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn title_scan_lines(mut self, n: usize) -> Self {
        self.config.title_scan_lines = n.clamp(1, MAX_TITLE_SCAN_LINES);
        self
    }

    pub fn strip_title_line(mut self, v: bool) -> Self {
        self.config.strip_title_line = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Docx2MdError> {
        let c = &self.config;
        if c.title_scan_lines == 0 || c.title_scan_lines > MAX_TITLE_SCAN_LINES {
            return Err(Docx2MdError::Configuration(format!(
                "Title scan window must be 1–{}, got {}",
                MAX_TITLE_SCAN_LINES, c.title_scan_lines
            )));
        }
        Ok(self.config)
    }
}

// ── Service configuration ────────────────────────────────────────────────

/// Default listen address for `docx2md serve`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7071";

/// Default maximum request body size: 50 MiB.
///
/// Base64 inflates by a third, so this admits documents up to ~37 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Process-wide settings for the HTTP service.
///
/// Built once at startup (the binary fills it from CLI flags with env
/// fallbacks) and handed to [`crate::server::AppState::new`], which calls
/// [`ServiceConfig::validate`] a single time.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: SocketAddr,

    /// Storage connection string (`AZURE_STORAGE_CONNECTION_STRING`).
    ///
    /// Required: a missing or blank value makes every conversion request
    /// fail with [`Docx2MdError::Configuration`].
    pub storage_connection_string: Option<String>,

    /// Largest accepted request body in bytes. Default: 50 MiB.
    pub max_body_bytes: usize,

    /// Per-request conversion settings.
    pub conversion: ConversionConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7071)),
            storage_connection_string: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            conversion: ConversionConfig::default(),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("bind_addr", &self.bind_addr)
            .field(
                "storage_connection_string",
                &self.storage_connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("max_body_bytes", &self.max_body_bytes)
            .field("conversion", &self.conversion)
            .finish()
    }
}

impl ServiceConfig {
    /// Check that all required settings are present.
    pub fn validate(&self) -> Result<(), Docx2MdError> {
        match self.storage_connection_string.as_deref() {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(Docx2MdError::Configuration(
                    STORAGE_NOT_CONFIGURED.to_string(),
                ))
            }
        }
        if self.max_body_bytes == 0 {
            return Err(Docx2MdError::Configuration(
                "Maximum body size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_the_smaller_one() {
        assert_eq!(ConversionConfig::default().title_scan_lines, 10);
        assert!(!ConversionConfig::default().strip_title_line);
    }

    #[test]
    fn builder_clamps_window() {
        let c = ConversionConfig::builder().title_scan_lines(0).build().unwrap();
        assert_eq!(c.title_scan_lines, 1);
        let c = ConversionConfig::builder()
            .title_scan_lines(10_000)
            .build()
            .unwrap();
        assert_eq!(c.title_scan_lines, MAX_TITLE_SCAN_LINES);
    }

    #[test]
    fn missing_connection_string_is_configuration_error() {
        let cfg = ServiceConfig::default();
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err,
            Docx2MdError::Configuration(STORAGE_NOT_CONFIGURED.to_string())
        );
    }

    #[test]
    fn blank_connection_string_is_rejected() {
        let cfg = ServiceConfig {
            storage_connection_string: Some("   ".into()),
            ..ServiceConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn valid_config_passes() {
        let cfg = ServiceConfig {
            storage_connection_string: Some("DefaultEndpointsProtocol=https;AccountName=x".into()),
            ..ServiceConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn debug_redacts_connection_string() {
        let cfg = ServiceConfig {
            storage_connection_string: Some("AccountKey=secret".into()),
            ..ServiceConfig::default()
        };
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("secret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn default_bind_addr_matches_constant() {
        let parsed: SocketAddr = DEFAULT_BIND_ADDR.parse().unwrap();
        assert_eq!(ServiceConfig::default().bind_addr, parsed);
    }
}
