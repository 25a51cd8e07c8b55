use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::extractors::VideoTranscript;
use crate::utils::sanitize_filename;

/// A finished transcript as written to disk
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptDocument {
    pub video_id: String,

    /// Upstream title; rendered as `"Unknown"` when absent
    #[serde(serialize_with = "title_or_unknown")]
    pub title: Option<String>,

    pub transcript: String,
    pub fetched_at: DateTime<Utc>,
}

impl TranscriptDocument {
    pub fn new(video_id: &str, found: VideoTranscript) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: found.title,
            transcript: found.transcript,
            fetched_at: Utc::now(),
        }
    }

    /// File name for this document, without directory
    pub fn file_name(&self, format: &OutputFormat) -> String {
        let stem = match &self.title {
            Some(title) => sanitize_filename(title, &self.video_id),
            None => self.video_id.clone(),
        };
        format!("{}.{}", stem, format.extension())
    }

    pub fn render(&self, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(format!("{}\n", self.transcript)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize transcript")
            }
        }
    }
}

fn title_or_unknown<S: Serializer>(title: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(title.as_deref().unwrap_or(crate::server::UNKNOWN_TITLE))
}

/// Save a transcript into `dir`, returning the path written.
///
/// An existing file with the same name is not overwritten; the video id is
/// appended to the stem instead.
pub fn save_to_dir(doc: &TranscriptDocument, dir: &Path, format: &OutputFormat) -> Result<PathBuf> {
    fs_err::create_dir_all(dir)?;

    let mut path = dir.join(doc.file_name(format));
    if path.exists() {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        path = dir.join(format!("{}-{}.{}", stem, doc.video_id, format.extension()));
    }

    fs_err::write(&path, doc.render(format)?)?;
    tracing::debug!("Wrote transcript for {} to {}", doc.video_id, path.display());
    Ok(path)
}
