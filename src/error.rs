//! Error type for the edgequake-docx2md library and service.
//!
//! A single closed enum, [`Docx2MdError`], covers every way a conversion
//! request can fail. The HTTP layer maps each variant to a status code with
//! [`Docx2MdError::status_code`] and uses the `Display` text as the `error`
//! field of the JSON failure envelope, so messages here are user-visible.
//!
//! The enum is `Clone` because a configuration failure is detected once at
//! startup and then reported again on every request.

use axum::http::StatusCode;
use thiserror::Error;

/// All errors returned by the edgequake-docx2md library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Docx2MdError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The request body is absent, is not JSON, or lacks the `docx` field.
    #[error("{0}")]
    InvalidInput(String),

    // ── Configuration errors ──────────────────────────────────────────────
    /// Required environment configuration is missing or empty.
    #[error("{0}")]
    Configuration(String),

    // ── Payload errors ────────────────────────────────────────────────────
    /// The `docx` field is not valid base64.
    #[error("Invalid base64 payload: {0}")]
    Decode(String),

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter could not read the bytes as a document of the declared format.
    #[error("Document conversion failed: {0}")]
    Conversion(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. the converter panicked).
    #[error("Internal error: {0}")]
    Unknown(String),
}

/// Message returned when the request carries no document.
pub const NO_DOCX_PROVIDED: &str = "No DOCX data provided";

/// Message returned when the storage connection string is absent.
pub const STORAGE_NOT_CONFIGURED: &str = "Storage connection string not configured";

impl Docx2MdError {
    /// The request carried no `docx` field (or an empty one).
    pub fn missing_document() -> Self {
        Self::InvalidInput(NO_DOCX_PROVIDED.to_string())
    }

    /// HTTP status this error is reported with.
    ///
    /// Only caller mistakes are 4xx; everything else is a 500 so clients
    /// treat it as a failed conversion rather than a bad request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Docx2MdError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Docx2MdError::Configuration(_)
            | Docx2MdError::Decode(_)
            | Docx2MdError::Conversion(_)
            | Docx2MdError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Docx2MdError::InvalidInput(_) => "invalid_input",
            Docx2MdError::Configuration(_) => "configuration",
            Docx2MdError::Decode(_) => "decode",
            Docx2MdError::Conversion(_) => "conversion",
            Docx2MdError::Unknown(_) => "unknown",
        }
    }
}
