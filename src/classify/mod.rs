use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `list=PL` followed by at least one playlist-id character
static REGULAR_PLAYLIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"list=PL[A-Za-z0-9_-]+").expect("valid playlist regex"));

/// Kind of URL, decides output layout and downloader flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlCategory {
    /// Auto-generated radio playlist (`list=RD...`), capped to a fixed item count
    MixPlaylist,
    /// User-curated playlist (`list=PL...`), downloaded in full
    RegularPlaylist,
    /// A single `watch?v=` URL without any list parameter
    SingleVideo,
    /// Anything else; downloaded like a single video
    Unknown,
}

impl UrlCategory {
    /// Whether this category gets its own folder named after the playlist
    pub fn is_playlist(&self) -> bool {
        matches!(self, UrlCategory::MixPlaylist | UrlCategory::RegularPlaylist)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrlCategory::MixPlaylist => "mix playlist",
            UrlCategory::RegularPlaylist => "regular playlist",
            UrlCategory::SingleVideo => "single video",
            UrlCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for UrlCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a URL by its lexical shape. First match wins, so a URL carrying
/// both markers is a mix playlist.
pub fn classify(url: &str) -> UrlCategory {
    if url.contains("list=RD") {
        UrlCategory::MixPlaylist
    } else if REGULAR_PLAYLIST.is_match(url) || url.contains("playlist?list=PL") {
        UrlCategory::RegularPlaylist
    } else if url.contains("watch?v=") && !url.contains("list=") {
        UrlCategory::SingleVideo
    } else {
        UrlCategory::Unknown
    }
}
