//! InnerTube plumbing shared by the caption strategies.
//!
//! Request building lives on [`InnertubeClient`]; upstream responses are wrapped in
//! small accessor types whose getters all return `Option`, so a missing or reshaped
//! field never panics.

use serde_json::{json, Value};
use std::sync::Arc;

use super::tracks::CaptionTrack;
use crate::config::{ClientPersona, InnertubeConfig};
use crate::transport::{HttpResponse, HttpTransport};

/// Thin request builder over an [`HttpTransport`]
#[derive(Clone)]
pub struct InnertubeClient {
    transport: Arc<dyn HttpTransport>,
    config: InnertubeConfig,
}

impl InnertubeClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: InnertubeConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &InnertubeConfig {
        &self.config
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/youtubei/v1/{}?key={}&prettyPrint=false",
            self.config.base_url.trim_end_matches('/'),
            name,
            urlencoding::encode(&self.config.api_key)
        )
    }

    fn context(&self, persona: &ClientPersona) -> Value {
        json!({
            "client": {
                "hl": self.config.hl,
                "gl": self.config.gl,
                "clientName": persona.name,
                "clientVersion": persona.version,
            }
        })
    }

    fn api_headers(&self) -> Vec<(String, String)> {
        let origin = self.config.base_url.trim_end_matches('/').to_string();
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            ("Origin".to_string(), origin.clone()),
            ("Referer".to_string(), format!("{}/", origin)),
        ]
    }

    async fn post(&self, name: &str, body: Value) -> Result<Value, String> {
        let url = self.endpoint(name);
        tracing::debug!("POST /youtubei/v1/{}", name);

        let response = self
            .transport
            .post_json(&url, &self.api_headers(), &body)
            .await
            .map_err(|e| e.to_string())?;

        parse_json(name, response)
    }

    /// `player` call for one persona
    pub async fn player(&self, video_id: &str, persona: &ClientPersona) -> Result<PlayerResponse, String> {
        let body = json!({
            "context": self.context(persona),
            "videoId": video_id,
            "playbackContext": {
                "contentPlaybackContext": { "vis": 0, "splay": false }
            },
            "racyCheckOk": true,
            "contentCheckOk": true,
        });
        self.post("player", body).await.map(PlayerResponse)
    }

    /// `next` call, the watch-next payload holding the engagement panels
    pub async fn next(&self, video_id: &str, persona: &ClientPersona) -> Result<NextResponse, String> {
        let body = json!({
            "context": self.context(persona),
            "videoId": video_id,
        });
        self.post("next", body).await.map(NextResponse)
    }

    /// `get_transcript` call for a continuation token
    pub async fn get_transcript(&self, token: &str, persona: &ClientPersona) -> Result<TranscriptResponse, String> {
        let body = json!({
            "context": self.context(persona),
            "params": token,
        });
        self.post("get_transcript", body).await.map(TranscriptResponse)
    }

    /// Watch page HTML, fetched with consent cookies pre-set
    pub async fn watch_page(&self, video_id: &str) -> Result<String, String> {
        let url = format!(
            "{}/watch?v={}&hl={}&has_verified=1",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(video_id),
            urlencoding::encode(&self.config.hl)
        );
        let headers = vec![
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("Cookie".to_string(), self.config.consent_cookie.clone()),
        ];
        tracing::debug!("GET watch page for {}", video_id);

        let response = self
            .transport
            .get(&url, &headers)
            .await
            .map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(format!("page HTTP {}", response.status));
        }
        Ok(response.body)
    }

    /// Raw caption payload behind a track locator
    pub async fn caption_payload(&self, url: &str) -> Result<String, String> {
        let headers = vec![("User-Agent".to_string(), self.config.user_agent.clone())];
        let response = self
            .transport
            .get(url, &headers)
            .await
            .map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(format!("caption HTTP {}", response.status));
        }
        Ok(response.body)
    }
}

fn parse_json(name: &str, response: HttpResponse) -> Result<Value, String> {
    if !response.is_success() {
        return Err(format!("/{} HTTP {}", name, response.status));
    }
    serde_json::from_str(&response.body).map_err(|e| format!("/{} returned invalid JSON: {}", name, e))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `player` response, also the shape of the watch page's embedded player object
#[derive(Debug, Clone)]
pub struct PlayerResponse(pub Value);

impl PlayerResponse {
    pub fn title(&self) -> Option<&str> {
        non_empty_str(self.0.pointer("/videoDetails/title"))
    }

    pub fn playability_status(&self) -> Option<&str> {
        self.0.pointer("/playabilityStatus/status").and_then(Value::as_str)
    }

    /// True when the upstream flagged the video as not playable
    pub fn is_unplayable(&self) -> bool {
        matches!(
            self.playability_status(),
            Some("ERROR" | "UNPLAYABLE" | "LOGIN_REQUIRED" | "CONTENT_CHECK_REQUIRED" | "AGE_CHECK_REQUIRED")
        )
    }

    /// Caption tracks in upstream order; malformed entries are skipped
    pub fn caption_tracks(&self) -> Vec<CaptionTrack> {
        self.0
            .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
            .and_then(Value::as_array)
            .map(|tracks| {
                tracks
                    .iter()
                    .filter_map(|t| serde_json::from_value(t.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub const TRANSCRIPT_PANEL_ID: &str = "engagement-panel-searchable-transcript";

/// `next` response
#[derive(Debug, Clone)]
pub struct NextResponse(pub Value);

impl NextResponse {
    pub fn title(&self) -> Option<&str> {
        non_empty_str(self.0.pointer(
            "/contents/twoColumnWatchNextResults/results/results/contents/0/videoPrimaryInfoRenderer/title/runs/0/text",
        ))
        .or_else(|| non_empty_str(self.0.pointer("/videoDetails/title")))
    }

    /// Content node of the searchable-transcript engagement panel
    pub fn transcript_panel_content(&self) -> Option<&Value> {
        self.0
            .get("engagementPanels")?
            .as_array()?
            .iter()
            .filter_map(|panel| panel.get("engagementPanelSectionListRenderer"))
            .find(|renderer| {
                renderer.get("panelIdentifier").and_then(Value::as_str) == Some(TRANSCRIPT_PANEL_ID)
            })
            .and_then(|renderer| renderer.get("content"))
    }
}

/// Continuation token for `get_transcript`, looked up in the three known places
pub fn find_continuation_token(content: &Value) -> Option<String> {
    if let Some(token) = content
        .get("continuationItemRenderer")
        .and_then(continuation_item_token)
    {
        return Some(token);
    }

    let sections = content
        .pointer("/sectionListRenderer/contents")
        .and_then(Value::as_array)?;

    for section in sections {
        if let Some(token) = section
            .get("continuationItemRenderer")
            .and_then(continuation_item_token)
        {
            return Some(token);
        }

        let menu_items = section
            .pointer("/transcriptRenderer/footer/transcriptFooterRenderer/languageMenu/sortFilterSubMenuRenderer/subMenuItems")
            .and_then(Value::as_array);
        if let Some(items) = menu_items {
            let preferred = items
                .iter()
                .find(|item| {
                    let english = item
                        .get("title")
                        .and_then(Value::as_str)
                        .map(|t| t.to_lowercase().contains("english"))
                        .unwrap_or(false);
                    let selected = item.get("selected").and_then(Value::as_bool).unwrap_or(false);
                    english || selected
                })
                .or_else(|| items.first());

            if let Some(token) = preferred
                .and_then(|item| item.pointer("/continuation/reloadContinuationData/continuation"))
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
            {
                return Some(token.to_string());
            }
        }
    }

    None
}

fn continuation_item_token(item: &Value) -> Option<String> {
    item.pointer("/continuationEndpoint/getTranscriptEndpoint/params")
        .or_else(|| item.pointer("/continuationEndpoint/continuationCommand/token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// `get_transcript` response
#[derive(Debug, Clone)]
pub struct TranscriptResponse(pub Value);

impl TranscriptResponse {
    /// Segment texts in playback order; `None` when the segment list is absent
    pub fn segment_texts(&self) -> Option<Vec<String>> {
        let segments = self
            .0
            .pointer(
                "/actions/0/updateEngagementPanelAction/content/transcriptRenderer/content/transcriptSearchPanelRenderer/body/transcriptSegmentListRenderer/initialSegments",
            )
            .and_then(Value::as_array)?;

        Some(segments.iter().map(segment_text).collect())
    }
}

fn segment_text(segment: &Value) -> String {
    let Some(snippet) = segment.pointer("/transcriptSegmentRenderer/snippet") else {
        return String::new();
    };

    if let Some(text) = snippet.get("simpleText").and_then(Value::as_str) {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    snippet
        .get("runs")
        .and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;

    fn client(fake: FakeTransport) -> (Arc<FakeTransport>, InnertubeClient) {
        let fake = Arc::new(fake);
        let client = InnertubeClient::new(fake.clone(), InnertubeConfig::default());
        (fake, client)
    }

    #[tokio::test]
    async fn player_request_carries_persona_and_video_id() {
        let (fake, client) = client(FakeTransport::new().route_json("/player", json!({})));
        client.player("dQw4w9WgXcQ", &ClientPersona::mobile_web()).await.unwrap();

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert!(request.url.starts_with("https://www.youtube.com/youtubei/v1/player?key="));
        assert!(request.url.ends_with("&prettyPrint=false"));

        let body = request.body.as_ref().unwrap();
        assert_eq!(body["videoId"], "dQw4w9WgXcQ");
        assert_eq!(body["context"]["client"]["clientName"], "MWEB");
        assert_eq!(body["context"]["client"]["hl"], "en");
        assert_eq!(body["racyCheckOk"], true);
        assert!(request
            .headers
            .iter()
            .any(|(k, v)| k == "Origin" && v == "https://www.youtube.com"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (_, client) = client(FakeTransport::new().route("/next", 429, "slow down"));
        let err = client.next("dQw4w9WgXcQ", &ClientPersona::web()).await.unwrap_err();
        assert_eq!(err, "/next HTTP 429");
    }

    #[tokio::test]
    async fn invalid_json_is_reported() {
        let (_, client) = client(FakeTransport::new().route("/get_transcript", 200, "<html>"));
        let err = client.get_transcript("tok", &ClientPersona::web()).await.unwrap_err();
        assert!(err.starts_with("/get_transcript returned invalid JSON"));
    }

    #[tokio::test]
    async fn watch_page_sends_consent_cookie() {
        let (fake, client) = client(FakeTransport::new().route("/watch?v=", 200, "<html/>"));
        client.watch_page("dQw4w9WgXcQ").await.unwrap();

        let request = &fake.requests()[0];
        assert_eq!(request.method, "GET");
        assert!(request.url.contains("/watch?v=dQw4w9WgXcQ&hl=en&has_verified=1"));
        assert!(request
            .headers
            .iter()
            .any(|(k, v)| k == "Cookie" && v.starts_with("CONSENT=PENDING+999")));
    }

    #[test]
    fn player_accessors_tolerate_missing_fields() {
        let empty = PlayerResponse(json!({}));
        assert_eq!(empty.title(), None);
        assert_eq!(empty.playability_status(), None);
        assert!(empty.caption_tracks().is_empty());
        assert!(!empty.is_unplayable());

        let odd = PlayerResponse(json!({
            "videoDetails": { "title": 42 },
            "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": "nope" } },
            "playabilityStatus": { "status": "ERROR" }
        }));
        assert_eq!(odd.title(), None);
        assert!(odd.caption_tracks().is_empty());
        assert!(odd.is_unplayable());
    }

    #[test]
    fn player_tracks_skip_malformed_entries() {
        let player = PlayerResponse(json!({
            "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": [
                { "languageCode": "en", "baseUrl": "https://x/a" },
                "garbage",
                { "languageCode": "fr", "kind": "asr", "baseUrl": "https://x/b" }
            ]}}
        }));
        let tracks = player.caption_tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].language_code.as_deref(), Some("fr"));
    }

    #[test]
    fn next_title_prefers_primary_info() {
        let next = NextResponse(json!({
            "contents": { "twoColumnWatchNextResults": { "results": { "results": { "contents": [
                { "videoPrimaryInfoRenderer": { "title": { "runs": [ { "text": "Primary" } ] } } }
            ]}}}},
            "videoDetails": { "title": "Details" }
        }));
        assert_eq!(next.title(), Some("Primary"));

        let fallback = NextResponse(json!({ "videoDetails": { "title": "Details" } }));
        assert_eq!(fallback.title(), Some("Details"));
    }

    #[test]
    fn finds_transcript_panel_among_others() {
        let next = NextResponse(json!({
            "engagementPanels": [
                { "engagementPanelSectionListRenderer": { "panelIdentifier": "comment-item-section", "content": {} } },
                { "somethingElse": {} },
                { "engagementPanelSectionListRenderer": {
                    "panelIdentifier": TRANSCRIPT_PANEL_ID,
                    "content": { "marker": 1 }
                } }
            ]
        }));
        assert_eq!(next.transcript_panel_content(), Some(&json!({ "marker": 1 })));
        assert_eq!(NextResponse(json!({})).transcript_panel_content(), None);
    }

    #[test]
    fn token_from_direct_continuation_item() {
        let content = json!({
            "continuationItemRenderer": {
                "continuationEndpoint": { "getTranscriptEndpoint": { "params": "direct-token" } }
            }
        });
        assert_eq!(find_continuation_token(&content).as_deref(), Some("direct-token"));

        let command = json!({
            "continuationItemRenderer": {
                "continuationEndpoint": { "continuationCommand": { "token": "command-token" } }
            }
        });
        assert_eq!(find_continuation_token(&command).as_deref(), Some("command-token"));
    }

    #[test]
    fn token_from_section_list() {
        let content = json!({
            "sectionListRenderer": { "contents": [
                { "itemSectionRenderer": {} },
                { "continuationItemRenderer": {
                    "continuationEndpoint": { "getTranscriptEndpoint": { "params": "section-token" } }
                } }
            ]}
        });
        assert_eq!(find_continuation_token(&content).as_deref(), Some("section-token"));
    }

    fn menu(items: Value) -> Value {
        json!({
            "sectionListRenderer": { "contents": [
                { "transcriptRenderer": { "footer": { "transcriptFooterRenderer": {
                    "languageMenu": { "sortFilterSubMenuRenderer": { "subMenuItems": items } }
                } } } }
            ]}
        })
    }

    fn menu_item(title: &str, selected: bool, token: &str) -> Value {
        json!({
            "title": title,
            "selected": selected,
            "continuation": { "reloadContinuationData": { "continuation": token } }
        })
    }

    #[test]
    fn token_from_language_menu_prefers_english_or_selected() {
        let english = menu(json!([
            menu_item("German", false, "de-token"),
            menu_item("English (auto-generated)", false, "en-token"),
        ]));
        assert_eq!(find_continuation_token(&english).as_deref(), Some("en-token"));

        let selected = menu(json!([
            menu_item("German", false, "de-token"),
            menu_item("Spanish", true, "es-token"),
        ]));
        assert_eq!(find_continuation_token(&selected).as_deref(), Some("es-token"));

        let first = menu(json!([
            menu_item("German", false, "de-token"),
            menu_item("Spanish", false, "es-token"),
        ]));
        assert_eq!(find_continuation_token(&first).as_deref(), Some("de-token"));
    }

    #[test]
    fn no_token_anywhere() {
        assert_eq!(find_continuation_token(&json!({})), None);
        assert_eq!(find_continuation_token(&menu(json!([]))), None);
    }

    #[test]
    fn segment_texts_use_simple_text_or_runs() {
        let response = TranscriptResponse(json!({
            "actions": [ { "updateEngagementPanelAction": { "content": { "transcriptRenderer": { "content": {
                "transcriptSearchPanelRenderer": { "body": { "transcriptSegmentListRenderer": {
                    "initialSegments": [
                        { "transcriptSegmentRenderer": { "snippet": { "simpleText": "simple" } } },
                        { "transcriptSegmentRenderer": { "snippet": { "runs": [ { "text": "ru" }, { "text": "ns" } ] } } },
                        { "transcriptSectionHeaderRenderer": {} }
                    ]
                } } }
            } } } } }
            ]
        }));
        assert_eq!(
            response.segment_texts(),
            Some(vec!["simple".to_string(), "runs".to_string(), String::new()])
        );
        assert_eq!(TranscriptResponse(json!({ "actions": [] })).segment_texts(), None);
    }
}
