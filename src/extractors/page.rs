use async_trait::async_trait;

use super::innertube::{InnertubeClient, PlayerResponse};
use super::scan::extract_balanced_object;
use super::tracks::transcript_from_player;
use super::{CaptionStrategy, RetrievalOutcome, VideoId};

const PLAYER_RESPONSE_VAR: &str = "ytInitialPlayerResponse";

/// Watch-page scrape: pull the embedded player object out of the HTML
pub struct PageScrapeStrategy {
    client: InnertubeClient,
}

impl PageScrapeStrategy {
    pub fn new(client: InnertubeClient) -> Self {
        Self { client }
    }
}

/// A consent interstitial served instead of the watch page
pub fn is_consent_wall(html: &str) -> bool {
    html.contains("consent.youtube.com")
        || (html.contains("CONSENT") && !html.contains(PLAYER_RESPONSE_VAR))
}

#[async_trait]
impl CaptionStrategy for PageScrapeStrategy {
    fn name(&self) -> String {
        "page".to_string()
    }

    async fn run(&self, video_id: &VideoId) -> RetrievalOutcome {
        let html = match self.client.watch_page(video_id.as_str()).await {
            Ok(html) => html,
            Err(reason) => return RetrievalOutcome::transient(reason),
        };

        if is_consent_wall(&html) {
            return RetrievalOutcome::transient("got consent page");
        }

        let Some(object) = extract_balanced_object(&html, PLAYER_RESPONSE_VAR) else {
            return RetrievalOutcome::transient(format!("no {} in HTML", PLAYER_RESPONSE_VAR));
        };

        let player = match serde_json::from_str(object) {
            Ok(value) => PlayerResponse(value),
            Err(e) => {
                return RetrievalOutcome::transient(format!("invalid {} JSON: {}", PLAYER_RESPONSE_VAR, e))
            }
        };

        transcript_from_player(&self.client, &player, " in page data").await
    }
}
