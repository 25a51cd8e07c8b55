use serde::Deserialize;

use super::innertube::{InnertubeClient, PlayerResponse};
use super::{RetrievalOutcome, VideoTranscript};
use crate::config::CaptionFormat;
use crate::transcribe::normalizer::{self, CaptionEncoding};

/// A selectable caption stream as listed by the player
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    #[serde(default)]
    pub language_code: Option<String>,

    /// `"asr"` for auto-generated tracks, absent for manual ones
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,
}

impl CaptionTrack {
    pub fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn language(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    /// Locator for the payload in the requested format
    pub fn payload_url(&self, format: CaptionFormat) -> Option<String> {
        let base = self.base_url.as_deref().filter(|u| !u.is_empty())?;
        match format {
            CaptionFormat::Xml => Some(base.to_string()),
            CaptionFormat::Json3 if base.contains("fmt=") => Some(base.to_string()),
            CaptionFormat::Json3 => {
                let separator = if base.contains('?') { '&' } else { '?' };
                Some(format!("{}{}fmt=json3", base, separator))
            }
        }
    }
}

/// Pick the track to fetch.
///
/// Manual English first, then any English, then any `en*` variant, then whatever the
/// upstream listed first.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language() == Some("en") && !t.is_auto_generated())
        .or_else(|| tracks.iter().find(|t| t.language() == Some("en")))
        .or_else(|| {
            tracks
                .iter()
                .find(|t| t.language().map(|l| l.starts_with("en")).unwrap_or(false))
        })
        .or_else(|| tracks.first())
}

/// Shared tail of the player-shaped strategies: select, fetch, normalize.
///
/// `source` is appended to the no-tracks reason, e.g. `" in page data"`.
pub(crate) async fn transcript_from_player(
    client: &InnertubeClient,
    player: &PlayerResponse,
    source: &str,
) -> RetrievalOutcome {
    let title = player.title().map(str::to_string);
    let tracks = player.caption_tracks();

    if tracks.is_empty() {
        let status = player.playability_status().unwrap_or("unknown");
        return RetrievalOutcome::not_found(format!("no caption tracks{} (status: {})", source, status));
    }

    let Some(track) = select_track(&tracks) else {
        return RetrievalOutcome::not_found(format!("no caption tracks{}", source));
    };
    tracing::debug!(
        "Selected caption track language={:?} kind={:?} of {}",
        track.language_code,
        track.kind,
        tracks.len()
    );

    let format = client.config().caption_format;
    let Some(url) = track.payload_url(format) else {
        return RetrievalOutcome::transient("no baseUrl on track");
    };

    let payload = match client.caption_payload(&url).await {
        Ok(payload) => payload,
        Err(reason) => return RetrievalOutcome::transient(reason),
    };

    match normalizer::normalize(&payload, CaptionEncoding::detect(&url, &payload)) {
        None => RetrievalOutcome::transient("unparseable caption payload"),
        Some(text) if text.is_empty() => RetrievalOutcome::not_found("empty caption transcript"),
        Some(transcript) => RetrievalOutcome::Success(VideoTranscript { title, transcript }),
    }
}
