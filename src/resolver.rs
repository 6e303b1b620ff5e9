//! Card Image Resolver
//!
//! Per-session image resolution for cards: acquire, fall back, and retry a
//! failed Spotify card once with a freshly looked-up URL.
//!
//! # States
//! `NoImage -> Fetching -> Cached | Failed`, `Failed -> Fetching` at most once,
//! then `Cached | FailedFinal`. Nothing here is persisted.
//!
//! A card's session is tied to its current `image_url` and `link`; editing
//! either starts a fresh session. A `Cached` state is only reused while the
//! cache still holds its file, and `FailedFinal` lasts for the failure grace
//! window.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::current_timestamp_ms;
use crate::engine::ArtworkCache;
use crate::fallback::{resolve_default, Asset, Category, GENERIC_ICON};
use crate::lookup::MetadataLookup;
use crate::retry::RetryPolicy;
use crate::youtube::YouTubeLinks;

/// Cards remembered at once before the least recently updated is dropped.
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

// == Card ==
/// What the renderer knows about a card's artwork.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub id: String,
    pub category: Option<Category>,
    /// Remote artwork URL, or a bundled/local path
    pub image_url: Option<String>,
    /// Link to the content on its provider
    pub link: Option<String>,
}

// == Image State ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    NoImage,
    Fetching,
    Cached(String),
    Failed,
    FailedFinal,
}

// == Resolved Image ==
/// What the renderer should draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ResolvedImage {
    Cached { handle: String, retried: bool },
    Fallback { asset: Asset, icon: &'static str },
}

// == Card Session ==
#[derive(Debug, Clone)]
struct CardSession {
    image_url: Option<String>,
    link: Option<String>,
    state: ImageState,
    /// Remote URL the cached handle came from; None for local paths
    source: Option<String>,
    retried: bool,
    updated_at: i64,
}

impl CardSession {
    fn new(card: &Card, now: i64) -> Self {
        Self {
            image_url: card.image_url.clone(),
            link: card.link.clone(),
            state: ImageState::NoImage,
            source: None,
            retried: false,
            updated_at: now,
        }
    }

    fn describes(&self, card: &Card) -> bool {
        self.image_url == card.image_url && self.link == card.link
    }
}

struct Sessions {
    cards: HashMap<String, CardSession>,
    capacity: usize,
}

impl Sessions {
    fn new(capacity: usize) -> Self {
        Self {
            cards: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn current(&self, card: &Card) -> Option<&CardSession> {
        self.cards.get(&card.id).filter(|s| s.describes(card))
    }

    /// Session for `card`, replacing one opened for other artwork.
    fn card_mut(&mut self, card: &Card) -> &mut CardSession {
        let now = current_timestamp_ms();
        if self.cards.get(&card.id).is_some_and(|s| !s.describes(card)) {
            self.cards.remove(&card.id);
        }
        if !self.cards.contains_key(&card.id) && self.cards.len() >= self.capacity {
            self.evict_oldest();
        }

        let session = self
            .cards
            .entry(card.id.clone())
            .or_insert_with(|| CardSession::new(card, now));
        session.updated_at = now;
        session
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .cards
            .iter()
            .min_by_key(|(_, s)| s.updated_at)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.cards.remove(&id);
        }
    }
}

// == Card Image Resolver ==
pub struct CardImageResolver {
    cache: ArtworkCache,
    retry: RetryPolicy,
    lookup: Arc<dyn MetadataLookup>,
    youtube: YouTubeLinks,
    sessions: Mutex<Sessions>,
}

impl CardImageResolver {
    pub fn new(cache: ArtworkCache, retry: RetryPolicy, lookup: Arc<dyn MetadataLookup>) -> Self {
        Self::with_capacity(cache, retry, lookup, DEFAULT_SESSION_CAPACITY)
    }

    /// Like [`CardImageResolver::new`], remembering at most `capacity` cards.
    pub fn with_capacity(
        cache: ArtworkCache,
        retry: RetryPolicy,
        lookup: Arc<dyn MetadataLookup>,
        capacity: usize,
    ) -> Self {
        Self {
            cache,
            retry,
            lookup,
            youtube: YouTubeLinks::new(),
            sessions: Mutex::new(Sessions::new(capacity)),
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn cache(&self) -> &ArtworkCache {
        &self.cache
    }

    /// Current state of a card in this session.
    pub async fn state(&self, card_id: &str) -> ImageState {
        self.sessions
            .lock()
            .await
            .cards
            .get(card_id)
            .map(|s| s.state.clone())
            .unwrap_or(ImageState::NoImage)
    }

    /// Number of cards with a session.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.cards.len()
    }

    // == Resolve ==
    /// Resolves the image for `card`. Never fails; the worst case is a fallback.
    pub async fn resolve(&self, card: &Card) -> ResolvedImage {
        if let Some(image) = self.reuse(card).await {
            return image;
        }

        self.set_state(card, ImageState::Fetching, None).await;

        let acquired = match card.image_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) if is_remote(url) => self.acquire(url).await,
            Some(path) => Some((path.to_string(), None)),
            None => match self.video_thumbnail(card) {
                Some(url) => self.acquire(&url).await,
                None => None,
            },
        };

        match acquired {
            Some((handle, source)) => {
                self.set_state(card, ImageState::Cached(handle.clone()), source)
                    .await;
                ResolvedImage::Cached {
                    handle,
                    retried: false,
                }
            }
            None => {
                self.set_state(card, ImageState::Failed, None).await;
                self.after_failure(card).await
            }
        }
    }

    /// Called when a cached file failed to decode or display.
    pub async fn report_render_failure(&self, card: &Card) -> ResolvedImage {
        debug!("Render failure reported for card {}", card.id);
        self.set_state(card, ImageState::Failed, None).await;
        self.after_failure(card).await
    }

    // == Maintenance ==
    /// Drops sessions whose cached file is gone and final failures past the
    /// grace window. Returns how many were dropped.
    pub async fn prune(&self) -> usize {
        let now = current_timestamp_ms();
        let grace_ms = self.cache.policy().await.failure_grace.as_millis() as i64;

        let cached: Vec<(String, String)> = self
            .sessions
            .lock()
            .await
            .cards
            .iter()
            .filter(|(_, s)| matches!(s.state, ImageState::Cached(_)))
            .filter_map(|(id, s)| s.source.clone().map(|url| (id.clone(), url)))
            .collect();

        let mut gone = Vec::new();
        for (id, url) in cached {
            if !self.cache.is_valid(&url).await {
                gone.push((id, url));
            }
        }

        let mut sessions = self.sessions.lock().await;
        let before = sessions.cards.len();
        sessions.cards.retain(|id, s| {
            let file_gone = gone
                .iter()
                .any(|(gone_id, url)| gone_id == id && s.source.as_deref() == Some(url));
            let failure_over =
                s.state == ImageState::FailedFinal && now - s.updated_at >= grace_ms;
            !(file_gone || failure_over)
        });

        let removed = before - sessions.cards.len();
        if removed > 0 {
            debug!("Dropped {} card sessions", removed);
        }
        removed
    }

    /// Forgets every card session.
    pub async fn reset(&self) {
        self.sessions.lock().await.cards.clear();
    }

    /// Outcome recorded for this card's current artwork, if still usable.
    async fn reuse(&self, card: &Card) -> Option<ResolvedImage> {
        let session = self.sessions.lock().await.current(card).cloned()?;

        match session.state {
            ImageState::Cached(handle) => {
                if let Some(url) = &session.source {
                    if !self.cache.is_valid(url).await {
                        debug!("Cached artwork for card {} is gone, resolving again", card.id);
                        self.forget(card).await;
                        return None;
                    }
                }
                Some(ResolvedImage::Cached {
                    handle,
                    retried: session.retried,
                })
            }
            ImageState::FailedFinal => {
                let grace = self.cache.policy().await.failure_grace;
                let age_ms = current_timestamp_ms() - session.updated_at;
                if age_ms >= grace.as_millis() as i64 {
                    self.forget(card).await;
                    return None;
                }
                Some(fallback_for(card))
            }
            _ => None,
        }
    }

    async fn forget(&self, card: &Card) {
        self.sessions.lock().await.cards.remove(&card.id);
    }

    async fn acquire(&self, url: &str) -> Option<(String, Option<String>)> {
        self.cache
            .acquire(url)
            .await
            .ok()
            .map(|handle| (handle, Some(url.to_string())))
    }

    /// Thumbnail for a video card without artwork.
    fn video_thumbnail(&self, card: &Card) -> Option<String> {
        if card.category != Some(Category::Video) {
            return None;
        }
        card.link
            .as_deref()
            .and_then(|link| self.youtube.thumbnail_url(link))
    }

    async fn after_failure(&self, card: &Card) -> ResolvedImage {
        let link = card.link.as_deref().unwrap_or_default();

        let may_retry = self.retry.should_auto_retry(link) && self.mark_retried(card).await;
        if !may_retry {
            self.set_state(card, ImageState::FailedFinal, None).await;
            return fallback_for(card);
        }

        info!("Retrying artwork for card {} via {}", card.id, link);
        self.set_state(card, ImageState::Fetching, None).await;

        let fresh_url = self
            .lookup
            .lookup(link)
            .await
            .and_then(|metadata| metadata.image_url)
            .filter(|url| is_remote(url));

        let acquired = match fresh_url {
            Some(url) => self.acquire(&url).await,
            None => None,
        };

        match acquired {
            Some((handle, source)) => {
                self.set_state(card, ImageState::Cached(handle.clone()), source)
                    .await;
                ResolvedImage::Cached {
                    handle,
                    retried: true,
                }
            }
            None => {
                self.set_state(card, ImageState::FailedFinal, None).await;
                fallback_for(card)
            }
        }
    }

    /// Spends the card's single retry. False if it was already spent.
    async fn mark_retried(&self, card: &Card) -> bool {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.card_mut(card);
        !std::mem::replace(&mut session.retried, true)
    }

    async fn set_state(&self, card: &Card, state: ImageState, source: Option<String>) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.card_mut(card);
        session.state = state;
        session.source = source;
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn fallback_for(card: &Card) -> ResolvedImage {
    ResolvedImage::Fallback {
        asset: resolve_default(card.category, card.image_url.as_deref()),
        icon: card.category.map(Category::icon).unwrap_or(GENERIC_ICON),
    }
}
