//! Video identifier extraction.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Matches the known URL shapes of the source platform: the canonical
/// watch-URL query form, youtu.be short links, embed paths and shorts paths.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/|youtube\.com/shorts/)([^"&?/\s]{11})"#,
    )
    .unwrap()
});

static BARE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Canonical 11-character identifier of a video on the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL, the form every conversion backend accepts.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a video identifier from an arbitrary input string.
///
/// Accepts any of the recognized URL shapes as well as a bare identifier.
/// Malformed or empty input yields `None`.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if BARE_ID_REGEX.is_match(input) {
        return Some(VideoId(input.to_owned()));
    }
    URL_REGEX
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_owned()))
}
