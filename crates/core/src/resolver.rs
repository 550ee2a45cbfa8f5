//! Video reference resolution.
//!
//! Turns the many URL shapes YouTube hands out (watch pages, `youtu.be` short
//! links, Shorts) into the bare 11-character video id and the canonical watch
//! URL that is sent to the model. No network lookups happen here: a well-formed
//! id for a private or deleted video resolves fine and only fails later, at the
//! model call.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

const SHORT_LINK_HOST: &str = "youtu.be";
const MAIN_DOMAIN: &str = "youtube.com";
const SHORTS_PREFIX: &str = "/shorts/";

fn id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid id regex"))
}

fn fallback_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:v=|youtu\.be/|/shorts/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)")
            .expect("valid fallback regex")
    })
}

/// Extract the video id from a YouTube URL, or `None` if there is none.
pub fn resolve_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    match from_parsed_url(input) {
        Some(candidate) => candidate,
        None => from_pattern(input),
    }
}

/// The normalized watch URL used for every external call.
pub fn canonical_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

pub fn is_valid_video_id(candidate: &str) -> bool {
    id_pattern().is_match(candidate)
}

/// `None` when the input is not a YouTube URL carrying an id candidate.
/// A candidate that is not a well-formed id resolves to `Some(None)`.
fn from_parsed_url(input: &str) -> Option<Option<String>> {
    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;

    let candidate = if host == SHORT_LINK_HOST {
        url.path_segments()?.next().map(str::to_string)
    } else if host.contains(MAIN_DOMAIN) {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                url.path()
                    .strip_prefix(SHORTS_PREFIX)
                    .and_then(|rest| rest.split('/').next())
                    .map(str::to_string)
            })
    } else {
        None
    };

    candidate.map(|id| is_valid_video_id(&id).then_some(id))
}

fn from_pattern(input: &str) -> Option<String> {
    fallback_pattern()
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
