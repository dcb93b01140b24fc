//! YouTube video id extraction

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref VIDEO_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
}

/// True for a bare 11-character YouTube id
pub fn is_video_id(candidate: &str) -> bool {
    VIDEO_ID_RE.is_match(candidate)
}

/// Extract the video id from an id or any usual YouTube URL
///
/// Accepted forms:
/// - `dQw4w9WgXcQ`
/// - `https://youtu.be/dQw4w9WgXcQ`
/// - `https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42`
/// - `https://www.youtube.com/embed/dQw4w9WgXcQ`
/// - `https://www.youtube.com/shorts/dQw4w9WgXcQ`
/// - `https://www.youtube.com/live/dQw4w9WgXcQ`
/// - `https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ`
///
/// The scheme may be omitted (`youtu.be/dQw4w9WgXcQ`).
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Ok(input.to_string());
    }

    let url = if input.contains("://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{}", input))
    }
    .map_err(|_| Error::InvalidVideoId(input.to_string()))?;

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let host = host
        .trim_start_matches("www.")
        .trim_start_matches("m.")
        .trim_start_matches("music.");

    let mut segments = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter();

    let candidate = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed" | "shorts" | "live" | "v") => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    };

    candidate
        .filter(|id| is_video_id(id))
        .ok_or_else(|| Error::InvalidVideoId(input.to_string()))
}

/// Public watch page of a video
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_accepted_forms() {
        for input in [
            "dQw4w9WgXcQ",
            "  dQw4w9WgXcQ\n",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=shared",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "http://youtube.com/v/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(input).unwrap(), ID, "input: {}", input);
        }
    }

    #[test]
    fn test_rejected_inputs() {
        for input in [
            "",
            "short",
            "https://vimeo.com/123456789",
            "https://www.youtube.com/watch?list=PL123",
            "https://www.youtube.com/channel/UC1234567890",
            "https://youtu.be/",
            "https://www.youtube.com/watch?v=tooShort",
        ] {
            assert!(
                matches!(extract_video_id(input), Err(Error::InvalidVideoId(_))),
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url(ID), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
