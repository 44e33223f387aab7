//! Error taxonomy for a single analysis attempt.
//!
//! Every failure surfaces as exactly one human-readable message in the
//! Error view. Nothing here is retried automatically.

use crate::validator::MAX_FILE_SIZE_BYTES;

/// Why a candidate file was refused before it became the selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Extension is not one of pdf, docx, txt.
    #[error("Invalid file type. Please upload a PDF, DOCX, or TXT file.")]
    InvalidType { extension: Option<String> },

    /// Larger than [`MAX_FILE_SIZE_BYTES`].
    #[error("File too large. Maximum size is {} MB.", MAX_FILE_SIZE_BYTES / (1024 * 1024))]
    TooLarge { byte_size: u64 },
}

/// Failure of one submission, caught at the controller boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request never produced a response.
    #[error("Failed to analyze document. Please try again.")]
    Transport { reason: String },

    /// Non-2xx response. Shows the server's `detail` when it sent one.
    #[error("{}", server_message(*status, detail.as_deref()))]
    Server { status: u16, detail: Option<String> },

    /// 2xx response without a usable `analysis` payload.
    #[error("Invalid response from server")]
    MalformedResponse { reason: String },
}

/// Unusable service origin.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid service origin '{origin}': {source}")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Service origin '{origin}' has no host")]
    MissingHost { origin: String },
}

fn server_message(status: u16, detail: Option<&str>) -> String {
    match detail {
        Some(detail) if !detail.trim().is_empty() => detail.to_string(),
        _ => format!("Server error: {}", status),
    }
}

impl SubmissionError {
    /// Short machine-friendly kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport { .. } => "transport",
            Self::Server { .. } => "server",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}
