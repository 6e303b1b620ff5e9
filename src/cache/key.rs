//! Cache Key Module
//!
//! Derives short, filesystem-safe cache keys from remote artwork URLs.

use sha2::{Digest, Sha256};

/// Extension used when the URL path does not carry a usable one.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Longest extension accepted from a URL path.
pub const MAX_EXTENSION_LEN: usize = 4;

// == Derived Key ==
/// Cache key and file extension derived from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedKey {
    /// Lowercase hex digest, 32 characters
    pub key: String,
    /// Validated extension without the leading dot
    pub extension: String,
}

impl DerivedKey {
    /// File name the artwork is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.key, self.extension)
    }
}

// == Derive Key ==
/// Derives the cache key for `url`.
///
/// The key is the first 16 bytes of the SHA-256 digest of the URL, hex encoded,
/// so its length does not depend on the input. Never fails.
pub fn derive_key(url: &str) -> DerivedKey {
    let digest = Sha256::digest(url.as_bytes());

    DerivedKey {
        key: hex::encode(&digest[..16]),
        extension: extension_of(url)
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string(),
    }
}

/// Extracts the extension of the last path segment, ignoring query and fragment.
fn extension_of(url: &str) -> Option<&str> {
    let without_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };

    let end = without_scheme
        .find(|c| c == '?' || c == '#')
        .unwrap_or(without_scheme.len());
    let location = &without_scheme[..end];

    // Everything before the first slash is the authority, never a file name
    let path = &location[location.find('/')?..];
    let segment = path.rsplit('/').next()?;
    let (_, extension) = segment.rsplit_once('.')?;

    let valid = !extension.is_empty()
        && extension.len() <= MAX_EXTENSION_LEN
        && extension.chars().all(|c| c.is_ascii_alphanumeric());

    valid.then_some(extension)
}
