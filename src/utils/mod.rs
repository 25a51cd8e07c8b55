use std::time::Duration;

/// Longest file stem produced by [`sanitize_filename`]
pub const MAX_FILENAME_LEN: usize = 80;

/// Split pasted input into candidate links.
///
/// Newlines and commas both separate entries; blank entries are dropped.
pub fn split_links(input: &str) -> Vec<String> {
    input
        .split(|c| c == '\n' || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn a video title into a safe file stem.
///
/// Keeps ASCII letters, digits, whitespace, `_` and `-`, collapses whitespace runs,
/// trims, and caps the result at [`MAX_FILENAME_LEN`] characters. Falls back to
/// `fallback` (normally the video id) when nothing usable is left.
pub fn sanitize_filename(title: &str, fallback: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-'))
        .collect();

    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(MAX_FILENAME_LEN).collect();
    let stem = truncated.trim();

    if stem.is_empty() {
        fallback.to_string()
    } else {
        stem.to_string()
    }
}

/// Format duration in human-readable format
pub fn format_duration(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;

    if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_links() {
        assert_eq!(
            split_links("https://youtu.be/a\n\n  https://youtu.be/b , https://youtu.be/c,\n"),
            vec!["https://youtu.be/a", "https://youtu.be/b", "https://youtu.be/c"]
        );
        assert!(split_links(" \n , ").is_empty());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Hello, World! (Official)", "id"), "Hello World Official");
        assert_eq!(sanitize_filename("  spaced \t out\n title ", "id"), "spaced out title");
        assert_eq!(sanitize_filename("a/b\\c:d", "id"), "abcd");
        assert_eq!(sanitize_filename("snake_case-and-dash", "id"), "snake_case-and-dash");
    }

    #[test]
    fn test_sanitize_filename_fallback() {
        assert_eq!(sanitize_filename("", "dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(sanitize_filename("日本語 !!!", "dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_sanitize_filename_length() {
        let long = "word ".repeat(40);
        let stem = sanitize_filename(&long, "id");
        assert!(stem.len() <= MAX_FILENAME_LEN);
        assert!(!stem.ends_with(' '));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }
}
