//! Fallback Resolver
//!
//! Picks a bundled default asset when no artwork can be shown for a card.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::Provider;

// == Asset ==
/// A bundled placeholder image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    /// File name inside the application's asset bundle
    pub file_name: &'static str,
}

impl Asset {
    const fn new(file_name: &'static str) -> Self {
        Self { file_name }
    }
}

/// Application-wide default, used when nothing more specific applies.
pub const GENERIC_ASSET: Asset = Asset::new("logo.jpg");

const FILM_ASSET: Asset = Asset::new("interstellar.jpg");
const SERIES_ASSET: Asset = Asset::new("fleabag.jpg");
const MUSIC_ASSET: Asset = Asset::new("seeyouagain.jpg");
const PODCAST_ASSET: Asset = Asset::new("floodcast.jpg");
const VIDEO_ASSET: Asset = Asset::new("everythingisaremix.jpg");

// == Category ==
/// Content category of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Film,
    Series,
    Music,
    Podcast,
    Video,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Film,
        Category::Series,
        Category::Music,
        Category::Podcast,
        Category::Video,
    ];

    pub fn default_asset(self) -> Asset {
        match self {
            Category::Film => FILM_ASSET,
            Category::Series => SERIES_ASSET,
            Category::Music => MUSIC_ASSET,
            Category::Podcast => PODCAST_ASSET,
            Category::Video => VIDEO_ASSET,
        }
    }

    /// Icon shown in place of artwork.
    pub fn icon(self) -> &'static str {
        match self {
            Category::Film => "film",
            Category::Series => "tv",
            Category::Music => "musical-notes",
            Category::Podcast => "radio",
            Category::Video => "logo-youtube",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the labels used by stored cards as well as the English names.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_lowercase().as_str() {
            "film" | "movie" => Ok(Category::Film),
            "série" | "serie" | "series" => Ok(Category::Series),
            "musique" | "music" => Ok(Category::Music),
            "podcast" => Ok(Category::Podcast),
            "youtube" | "video" => Ok(Category::Video),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Icon used when the category is unknown.
pub const GENERIC_ICON: &str = "help-circle";

// == Provider Defaults ==
/// Default asset for artwork coming from `provider`.
pub fn provider_asset(provider: Provider) -> Asset {
    match provider {
        Provider::Tmdb => FILM_ASSET,
        Provider::YouTube => VIDEO_ASSET,
        Provider::Spotify => MUSIC_ASSET,
        Provider::ApplePodcasts | Provider::ListenNotes => PODCAST_ASSET,
        Provider::Unknown => GENERIC_ASSET,
    }
}

// == Resolve Default ==
/// Returns the placeholder to render for a card.
///
/// The category wins; otherwise the provider is inferred from `url`;
/// otherwise the generic asset. Never fails.
pub fn resolve_default(category: Option<Category>, url: Option<&str>) -> Asset {
    if let Some(category) = category {
        return category.default_asset();
    }

    match url {
        Some(url) if !url.is_empty() => provider_asset(Provider::from_url(url)),
        _ => GENERIC_ASSET,
    }
}
