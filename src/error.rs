use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire tooling backend.
/// Every module returns `Result<T, ToolsError>`.
#[derive(Debug, Error)]
pub enum ToolsError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream {upstream} unreachable: {source}")]
    UpstreamUnreachable {
        upstream: String,
        source: reqwest::Error,
    },

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {url}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        url: String,
        expected: String,
        actual: String,
    },

    // ── Versions ────────────────────────────────────────
    #[error("Version not supported and not cached: {0}")]
    VersionNotFound(String),

    #[error("Asset generation failed for {0}")]
    GenerationFailed(String),

    // ── Uploads ─────────────────────────────────────────
    #[error("Pack validation failed: {}", .0.join("; "))]
    PackValidation(Vec<String>),

    // ── Archive ─────────────────────────────────────────
    #[error("Corrupt archive: {0}")]
    CorruptArchive(#[from] zip::result::ZipError),

    // ── Comparison ──────────────────────────────────────
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    // ── Images ──────────────────────────────────────────
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Generic ─────────────────────────────────────────
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type ToolsResult<T> = Result<T, ToolsError>;

impl From<std::io::Error> for ToolsError {
    fn from(source: std::io::Error) -> Self {
        ToolsError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for ToolsError {
    fn from(source: tokio::task::JoinError) -> Self {
        ToolsError::Other(format!("background task failed: {source}"))
    }
}
