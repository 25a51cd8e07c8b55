use async_trait::async_trait;

use super::innertube::InnertubeClient;
use super::tracks::transcript_from_player;
use super::{CaptionStrategy, RetrievalOutcome, VideoId};
use crate::config::ClientPersona;

/// Direct `player` call: read the track list, fetch the preferred track
pub struct PlayerStrategy {
    client: InnertubeClient,
    persona: ClientPersona,
}

impl PlayerStrategy {
    pub fn new(client: InnertubeClient, persona: ClientPersona) -> Self {
        Self { client, persona }
    }
}

#[async_trait]
impl CaptionStrategy for PlayerStrategy {
    fn name(&self) -> String {
        format!("player:{}", self.persona.name)
    }

    async fn run(&self, video_id: &VideoId) -> RetrievalOutcome {
        let player = match self.client.player(video_id.as_str(), &self.persona).await {
            Ok(player) => player,
            Err(reason) => return RetrievalOutcome::transient(reason),
        };

        if player.is_unplayable() && player.caption_tracks().is_empty() {
            return RetrievalOutcome::not_found(format!(
                "video unplayable (status: {})",
                player.playability_status().unwrap_or("unknown")
            ));
        }

        transcript_from_player(&self.client, &player, "").await
    }
}
