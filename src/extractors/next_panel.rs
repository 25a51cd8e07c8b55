use async_trait::async_trait;

use super::innertube::{find_continuation_token, InnertubeClient};
use super::{CaptionStrategy, RetrievalOutcome, VideoId, VideoTranscript};
use crate::config::ClientPersona;
use crate::transcribe::normalizer;

/// Two-step transcript panel lookup: `next` for the continuation token, then
/// `get_transcript` for the segment list
pub struct NextPanelStrategy {
    client: InnertubeClient,
    persona: ClientPersona,
}

impl NextPanelStrategy {
    pub fn new(client: InnertubeClient, persona: ClientPersona) -> Self {
        Self { client, persona }
    }
}

#[async_trait]
impl CaptionStrategy for NextPanelStrategy {
    fn name(&self) -> String {
        "next".to_string()
    }

    async fn run(&self, video_id: &VideoId) -> RetrievalOutcome {
        let next = match self.client.next(video_id.as_str(), &self.persona).await {
            Ok(next) => next,
            Err(reason) => return RetrievalOutcome::transient(reason),
        };
        let title = next.title().map(str::to_string);

        let Some(content) = next.transcript_panel_content() else {
            return RetrievalOutcome::not_found("no transcript panel");
        };
        let Some(token) = find_continuation_token(content) else {
            return RetrievalOutcome::not_found("no continuation token");
        };

        let transcript = match self.client.get_transcript(&token, &self.persona).await {
            Ok(response) => response,
            Err(reason) => return RetrievalOutcome::transient(reason),
        };

        let segments = match transcript.segment_texts() {
            Some(segments) if !segments.is_empty() => segments,
            _ => return RetrievalOutcome::not_found("no transcript segments"),
        };
        tracing::debug!("get_transcript returned {} segments for {}", segments.len(), video_id);

        let text = normalizer::normalize_segments(&segments);
        if text.is_empty() {
            return RetrievalOutcome::not_found("all segments empty");
        }

        RetrievalOutcome::Success(VideoTranscript { title, transcript: text })
    }
}
