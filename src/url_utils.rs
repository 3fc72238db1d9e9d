//! Recognizes YouTube video links and pulls the video id out of them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{error::FetchError, model::VideoId};

/// Accepted link shapes in priority order. Group 4 is always the video id;
/// anything after the 11 id characters is ignored.
static YOUTUBE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(https?://)?(www\.)?(youtube\.com/watch\?v=)([a-zA-Z0-9_-]{11})",
        r"^(https?://)?(www\.)?(youtu\.be/)([a-zA-Z0-9_-]{11})",
        r"^(https?://)?(www\.)?(youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
        r"^(https?://)?(www\.)?(youtube\.com/shorts/)([a-zA-Z0-9_-]{11})",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

const ID_GROUP: usize = 4;

/// Returns true if the trimmed input matches one of the accepted link shapes.
pub fn is_youtube_url(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return false;
    }
    YOUTUBE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// Checks a submitted link, telling apart empty input, a YouTube link in a
/// shape we don't know, and something that isn't YouTube at all.
pub fn validate_url(input: &str) -> Result<(), FetchError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(FetchError::EmptyInput);
    }

    if !is_youtube_url(trimmed) {
        if trimmed.contains("youtube") || trimmed.contains("youtu.be") {
            return Err(FetchError::MalformedYouTubeLink);
        }
        return Err(FetchError::NotAYouTubeLink);
    }

    Ok(())
}

/// Tries each link shape in order and returns the first captured id.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let trimmed = input.trim();
    YOUTUBE_PATTERNS.iter().find_map(|p| {
        p.captures(trimmed)
            .and_then(|caps| caps.get(ID_GROUP))
            .map(|m| VideoId::from_capture(m.as_str()))
    })
}
