//! Caption payload normalization.
//!
//! Turns a raw caption document into one line of plain text: fragments in playback
//! order, entities decoded, markup removed, whitespace collapsed.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Encoding of a raw caption payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionEncoding {
    /// Timed-text XML, a sequence of `<text>` elements
    Xml,
    /// JSON event stream (`fmt=json3`)
    JsonEvents,
}

impl CaptionEncoding {
    /// Pick the encoding for a fetched payload.
    ///
    /// An evidently XML or JSON body decides; otherwise the locator's `fmt`
    /// parameter does, defaulting to XML.
    pub fn detect(url: &str, body: &str) -> Self {
        match body.trim_start().chars().next() {
            Some('<') => return CaptionEncoding::Xml,
            Some('{') => return CaptionEncoding::JsonEvents,
            _ => {}
        }

        url::Url::parse(url)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "fmt")
                    .map(|(_, v)| v.into_owned())
            })
            .map(|fmt| {
                if fmt.starts_with("json") {
                    CaptionEncoding::JsonEvents
                } else {
                    CaptionEncoding::Xml
                }
            })
            .unwrap_or(CaptionEncoding::Xml)
    }
}

/// Normalize a caption payload into a single line of text.
///
/// Returns `None` when the payload holds no caption elements or events at all, and
/// `Some("")` when it does but none of them carry visible text.
pub fn normalize(raw: &str, encoding: CaptionEncoding) -> Option<String> {
    let joined = match encoding {
        CaptionEncoding::Xml => xml_fragments(raw)?.join(" "),
        CaptionEncoding::JsonEvents => json_event_texts(raw)?.join(" "),
    };
    Some(collapse_whitespace(&joined))
}

/// Join already-extracted segments and normalize whitespace
pub fn normalize_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = segments
        .into_iter()
        .filter(|s| !s.as_ref().trim().is_empty())
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

/// Newlines to spaces, whitespace runs to one space, trimmed
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").expect("valid text element pattern"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid tag pattern"))
}

fn xml_fragments(raw: &str) -> Option<Vec<String>> {
    let fragments: Vec<String> = text_element_regex()
        .captures_iter(raw)
        .map(|caps| clean_fragment(&caps[1]))
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments)
    }
}

fn clean_fragment(fragment: &str) -> String {
    // Timed-text sometimes escapes twice (`&amp;#39;`)
    let once = decode_entities(fragment);
    let decoded = if once.contains('&') {
        decode_entities(&once)
    } else {
        once
    };
    tag_regex().replace_all(&decoded, "").into_owned()
}

/// Decode HTML entities, named and numeric.
///
/// Anything that does not decode to a valid character is left as written.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CaptionEvent {
    segs: Vec<EventSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventSegment {
    utf8: Option<String>,
}

fn json_event_texts(raw: &str) -> Option<Vec<String>> {
    let stream: serde_json::Value = serde_json::from_str(raw).ok()?;
    let events = stream.get("events")?.as_array()?;
    if events.is_empty() {
        return None;
    }

    // Per-event parsing so one odd event does not sink the transcript
    let texts = events
        .iter()
        .filter_map(|event| serde_json::from_value::<CaptionEvent>(event.clone()).ok())
        .map(|event| {
            event
                .segs
                .iter()
                .filter_map(|seg| seg.utf8.as_deref())
                .collect::<String>()
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    Some(texts)
}
