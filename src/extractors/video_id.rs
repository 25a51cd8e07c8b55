use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::TranscriptError;

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid video id pattern"))
}

fn url_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"youtube\.com/watch\?v=([^&\s]+)",
            r"youtu\.be/([^?\s]+)",
            r"youtube\.com/embed/([^?\s]+)",
            r"youtube\.com/shorts/([^?\s]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid url pattern"))
        .collect()
    })
}

/// Pull a video identifier out of a pasted URL or bare id.
///
/// Known URL shapes are tried in a fixed order (`watch?v=`, `youtu.be/`, `embed/`,
/// `shorts/`) and the first capture is returned as-is; a bare 11-character token is
/// accepted last. The capture is not validated here, see [`VideoId::parse`].
pub fn extract_video_id(raw: &str) -> Option<String> {
    let input = raw.trim();

    for pattern in url_patterns() {
        if let Some(caps) = pattern.captures(input) {
            return Some(caps[1].to_string());
        }
    }

    if video_id_regex().is_match(input) {
        return Some(input.to_string());
    }

    None
}

/// A validated 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(candidate: &str) -> Result<Self, TranscriptError> {
        if video_id_regex().is_match(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(TranscriptError::InvalidInput(candidate.to_string()))
        }
    }

    /// Extract and validate in one step
    pub fn from_url(raw: &str) -> Result<Self, TranscriptError> {
        let candidate = extract_video_id(raw)
            .ok_or_else(|| TranscriptError::InvalidInput(raw.trim().to_string()))?;
        Self::parse(&candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
