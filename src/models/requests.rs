//! Request DTOs for the artwork service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::fallback::Category;
use crate::resolver::Card;

/// Request body for POST /acquire
#[derive(Debug, Clone, Deserialize)]
pub struct AcquireRequest {
    /// Remote artwork URL
    pub url: String,
}

impl AcquireRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Some("URL must use http or https".to_string());
        }
        None
    }
}

/// Request body for POST /resolve
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    /// Card identifier, scopes the per-session retry budget
    pub id: String,
    /// Category label as stored on the card (e.g. "Film", "Série")
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl ResolveRequest {
    pub fn validate(&self) -> Option<String> {
        if self.id.trim().is_empty() {
            return Some("Card id cannot be empty".to_string());
        }
        None
    }

    /// Converts to a card; unknown category labels are ignored.
    pub fn into_card(self) -> Card {
        Card {
            id: self.id,
            category: parse_category(self.category.as_deref()),
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            link: self.link.filter(|l| !l.trim().is_empty()),
        }
    }
}

/// Query string for GET /fallback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FallbackQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl FallbackQuery {
    pub fn category(&self) -> Option<Category> {
        parse_category(self.category.as_deref())
    }
}

/// Query string for GET /retry
#[derive(Debug, Clone, Deserialize)]
pub struct RetryQuery {
    pub url: String,
}

fn parse_category(label: Option<&str>) -> Option<Category> {
    label.and_then(|label| label.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_request_deserialize() {
        let json = r#"{"url": "https://image.tmdb.org/t/p/w500/abc123.jpg"}"#;
        let req: AcquireRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.url, "https://image.tmdb.org/t/p/w500/abc123.jpg");
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_validate_rejects_empty_and_non_http() {
        let empty = AcquireRequest {
            url: "  ".to_string(),
        };
        assert!(empty.validate().is_some());

        let file = AcquireRequest {
            url: "file:///etc/passwd".to_string(),
        };
        assert!(file.validate().is_some());
    }

    #[test]
    fn test_resolve_request_into_card() {
        let json = r#"{"id": "42", "category": "Série", "image_url": "", "link": "https://open.spotify.com/track/x"}"#;
        let req: ResolveRequest = serde_json::from_str(json).unwrap();
        let card = req.into_card();

        assert_eq!(card.id, "42");
        assert_eq!(card.category, Some(Category::Series));
        assert!(card.image_url.is_none());
        assert!(card.link.is_some());
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let query = FallbackQuery {
            category: Some("Livre".to_string()),
            url: None,
        };
        assert!(query.category().is_none());
    }
}
