use async_trait::async_trait;
use serde::Serialize;

pub mod innertube;
pub mod next_panel;
pub mod page;
pub mod player;
pub mod scan;
pub mod tracks;
pub mod video_id;

pub use next_panel::NextPanelStrategy;
pub use page::PageScrapeStrategy;
pub use player::PlayerStrategy;
pub use scan::extract_balanced_object;
pub use tracks::{select_track, CaptionTrack};
pub use video_id::{extract_video_id, VideoId};

/// A transcript recovered by one strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoTranscript {
    /// Video title, when the upstream exposed one
    pub title: Option<String>,

    /// Normalized transcript text
    pub transcript: String,
}

/// Result of one retrieval attempt, or of the whole fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Success(VideoTranscript),

    /// Upstream reachable, but no captions, tracks or segments exist
    NotFound { reason: String },

    /// Network error, unexpected shape, non-2xx status or parse failure
    TransientFailure { reason: String },
}

impl RetrievalOutcome {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound { reason: reason.into() }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::TransientFailure { reason: reason.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Failure reason, `None` on success
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::NotFound { reason } | Self::TransientFailure { reason } => Some(reason),
        }
    }
}

/// One retrieval path against the upstream.
///
/// Implementations convert every failure, including unexpected upstream shapes, into
/// an outcome; nothing escapes as an error or a panic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionStrategy: Send + Sync {
    /// Name used in logs and aggregated diagnostics
    fn name(&self) -> String;

    /// Try to retrieve a transcript for the video
    async fn run(&self, video_id: &VideoId) -> RetrievalOutcome;
}
