//! YouTube Transcripts - extract plain-text transcripts from YouTube videos
//!
//! This library resolves a video identifier into a normalized transcript by running a
//! fixed chain of caption retrieval strategies against YouTube's internal web surface,
//! and exposes the result through an HTTP endpoint and a sequential CLI job driver.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod jobs;
pub mod output;
pub mod server;
pub mod transcribe;
pub mod transport;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{extract_video_id, CaptionStrategy, RetrievalOutcome, VideoId, VideoTranscript};
pub use transcribe::{Resolution, TranscriptPipeline};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Machine-readable kind of a user-visible failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Internal,
}

/// Error types surfaced at the request boundary
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid video ID: {0}")]
    InvalidInput(String),

    #[error("No captions found for this video.{}", format_diagnostic(.0))]
    NotFound(Option<String>),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TranscriptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptError::InvalidInput(_) => ErrorKind::InvalidInput,
            TranscriptError::NotFound(_) => ErrorKind::NotFound,
            TranscriptError::Internal(_) => ErrorKind::Internal,
        }
    }
}

fn format_diagnostic(diagnostic: &Option<String>) -> String {
    match diagnostic {
        Some(d) if !d.is_empty() => format!(" [{}]", d),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_includes_bracketed_diagnostic() {
        let err = TranscriptError::NotFound(Some("player:WEB: HTTP 403; page: got consent page".into()));
        assert_eq!(
            err.to_string(),
            "No captions found for this video. [player:WEB: HTTP 403; page: got consent page]"
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn not_found_without_diagnostic_has_no_brackets() {
        assert_eq!(
            TranscriptError::NotFound(None).to_string(),
            "No captions found for this video."
        );
    }
}
