//! YouTube Links
//!
//! Derives a thumbnail URL from a YouTube video link, for video cards that
//! carry a link but no artwork.

use regex::Regex;

/// Host serving YouTube video thumbnails.
pub const THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

/// Thumbnail size requested for cards.
pub const THUMBNAIL_FILE: &str = "hqdefault.jpg";

const VIDEO_LINK_PATTERN: &str =
    r"^https?://(?:(?:www\.)?youtube\.com/(?:watch\?v=|embed/|v/)|youtu\.be/)";

const VIDEO_ID_PATTERNS: [&str; 2] = [
    r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([^&\n?#]+)",
    r"youtube\.com/watch\?.*&v=([^&\n?#]+)",
];

// == YouTube Links ==
#[derive(Debug, Clone)]
pub struct YouTubeLinks {
    video_link: Regex,
    video_id: Vec<Regex>,
}

impl YouTubeLinks {
    pub fn new() -> Self {
        Self {
            video_link: Regex::new(VIDEO_LINK_PATTERN).expect("valid YouTube link pattern"),
            video_id: VIDEO_ID_PATTERNS
                .iter()
                .map(|pattern| Regex::new(pattern).expect("valid YouTube id pattern"))
                .collect(),
        }
    }

    /// True for watch, short, embed and legacy `/v/` video links.
    pub fn is_video_link(&self, url: &str) -> bool {
        self.video_link.is_match(url.trim())
    }

    /// Video id carried by `url`, if any.
    pub fn video_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.video_id
            .iter()
            .find_map(|pattern| pattern.captures(url))
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str())
    }

    /// Thumbnail URL for a valid video link.
    pub fn thumbnail_url(&self, link: &str) -> Option<String> {
        let link = link.trim();
        if !self.is_video_link(link) {
            return None;
        }
        self.video_id(link)
            .map(|id| format!("{}/{}/{}", THUMBNAIL_BASE, id, THUMBNAIL_FILE))
    }
}

impl Default for YouTubeLinks {
    fn default() -> Self {
        Self::new()
    }
}
