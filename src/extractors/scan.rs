/// Find the JSON object assigned to `marker` in a script-bearing document.
///
/// Accepts `var marker = {`, `marker = {` and `window["marker"] = {`. From the opening
/// brace the scan counts depth, ignoring braces inside double-quoted strings and
/// honouring backslash escapes, and returns the exact balanced span. An occurrence
/// that is not an assignment, or never balances, is skipped in favour of the next.
pub fn extract_balanced_object<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }

    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(marker) {
        let marker_end = search_from + found + marker.len();
        search_from = marker_end;

        let Some(open) = assignment_brace(text, marker_end) else {
            continue;
        };
        if let Some(close) = matching_brace(text, open) {
            return Some(&text[open..=close]);
        }
    }

    None
}

/// Byte index of the `{` that starts the assigned value, if `pos` is followed by `= {`
fn assignment_brace(text: &str, pos: usize) -> Option<usize> {
    let rest = &text[pos..];
    // window["marker"] form
    let rest_trimmed = rest
        .strip_prefix("\"]")
        .or_else(|| rest.strip_prefix("']"))
        .unwrap_or(rest);
    let consumed = rest.len() - rest_trimmed.len();

    let after_ws = rest_trimmed.trim_start();
    let after_eq = after_ws.strip_prefix('=')?;
    // `==` is a comparison, not an assignment
    if after_eq.starts_with('=') {
        return None;
    }
    let value = after_eq.trim_start();
    if !value.starts_with('{') {
        return None;
    }

    Some(pos + consumed + (rest_trimmed.len() - value.len()))
}

/// Byte index of the `}` closing the object opened at `open`
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[open..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "ytInitialPlayerResponse";

    #[test]
    fn extracts_var_assignment() {
        let html = r#"<script>var ytInitialPlayerResponse = {"a":{"b":1}};var meta = {};</script>"#;
        assert_eq!(extract_balanced_object(html, MARKER), Some(r#"{"a":{"b":1}}"#));
    }

    #[test]
    fn extracts_bare_and_window_assignments() {
        let bare = r#"ytInitialPlayerResponse={"x":[1,2]};"#;
        assert_eq!(extract_balanced_object(bare, MARKER), Some(r#"{"x":[1,2]}"#));

        let window = r#"window["ytInitialPlayerResponse"] = {"y":true};"#;
        assert_eq!(extract_balanced_object(window, MARKER), Some(r#"{"y":true}"#));
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let html = r#"var ytInitialPlayerResponse = {"desc":"a } b { c","n":{"t":"}}"}}; after"#;
        assert_eq!(
            extract_balanced_object(html, MARKER),
            Some(r#"{"desc":"a } b { c","n":{"t":"}}"}}"#)
        );
    }

    #[test]
    fn escaped_quotes_keep_string_state() {
        let html = r#"var ytInitialPlayerResponse = {"q":"say \"}\" \\","k":{}};"#;
        assert_eq!(
            extract_balanced_object(html, MARKER),
            Some(r#"{"q":"say \"}\" \\","k":{}}"#)
        );
    }

    #[test]
    fn skips_non_assignment_mentions() {
        let html = concat!(
            r#"if (window.ytInitialPlayerResponse) {}"#,
            r#" if (ytInitialPlayerResponse == {}) {}"#,
            r#" var ytInitialPlayerResponse = {"ok":1};"#,
        );
        assert_eq!(extract_balanced_object(html, MARKER), Some(r#"{"ok":1}"#));
    }

    #[test]
    fn unbalanced_object_is_none() {
        let html = r#"var ytInitialPlayerResponse = {"a":{"b":1};"#;
        assert_eq!(extract_balanced_object(html, MARKER), None);
    }

    #[test]
    fn missing_marker_is_none() {
        assert_eq!(extract_balanced_object("<html></html>", MARKER), None);
        assert_eq!(extract_balanced_object("anything", ""), None);
    }

    #[test]
    fn handles_multibyte_text() {
        let html = "var ytInitialPlayerResponse = {\"title\":\"héllo {世界}\"};";
        assert_eq!(
            extract_balanced_object(html, MARKER),
            Some("{\"title\":\"héllo {世界}\"}")
        );
    }
}
