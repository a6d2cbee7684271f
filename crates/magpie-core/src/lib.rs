//! Magpie Core Library
//!
//! Core functionality for the Magpie page inspector including:
//! - Free-form URL normalization
//! - Fetching through a same-origin relay
//! - Image enumeration with size and file-type resolution
//! - Internal/external link classification
//! - Persisted search history

pub mod extract;
pub mod history;
pub mod image;
pub mod link;
pub mod normalize;
pub mod pipeline;
pub mod relay;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export key types
pub use history::{FileStore, HistoryEntry, HistoryStore, MemoryStore, Store};
pub use link::InternalLinkPolicy;
pub use pipeline::{InspectConfig, InspectEvent, Inspector, Stage};
pub use relay::{RelayClient, RelayResponse};

#[derive(Error, Debug)]
pub enum MagpieError {
    #[error("invalid URL format: {0:?} (expected http://yoursite.com or www.yoursite.com)")]
    InvalidUrl(String),

    #[error("failed to load {url}: the relay returned status {status}")]
    DocumentFetch { url: String, status: u16 },

    #[error("invalid image URL: {0:?}")]
    InvalidImageUrl(String),

    #[error("failed to fetch image {url}: the relay returned status {status}")]
    ImageFetch { url: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MagpieError>;

/// The assembled report for one inspected page.
///
/// Created fresh per extraction and never mutated after being handed to the
/// caller. Field names serialize in camelCase so persisted history matches
/// what the browser client stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Document title, or "No title found"
    pub title: String,
    /// Canonical URL the page was fetched from
    pub url: String,
    /// Images that had a usable source, in document order
    pub images: Vec<Image>,
    /// Count of img tags with no usable source attribute
    pub images_not_found: u32,
    /// Links whose href does not carry an explicit http(s) scheme
    pub internal_links: Vec<Link>,
    /// Links whose href starts with http:// or https://
    pub external_links: Vec<Link>,
    /// Total img tags discovered, usable source or not
    pub total_image_count: usize,
}

/// One resolved `<img>` reference.
///
/// `size` and `file_type` are best effort: `-1` and `"unknown"` mean the
/// image could not be fetched, while `0` and `""` mean the tag had no usable
/// source at all. Both are normal outcomes, not corruption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Unique within one Page (document index)
    pub id: u64,
    /// Canonical URL, or the raw candidate when resolution failed, or empty
    pub src: String,
    /// Lower-case extension, "unknown", or empty for the no-source case
    pub file_type: String,
    /// Byte count, 0 for the no-source case, -1 when undeterminable
    pub size: i64,
}

impl Image {
    /// The "no source" image: distinguishable from a fetch failure so the
    /// caller can count it instead of recording a placeholder.
    pub fn empty(id: u64) -> Self {
        Self {
            id,
            src: String::new(),
            file_type: String::new(),
            size: 0,
        }
    }

    /// Placeholder recorded when resolution fails, preserving enumeration
    /// order and count. `src` keeps the original unresolved candidate.
    pub fn placeholder(id: u64, candidate: &str) -> Self {
        Self {
            id,
            src: candidate.to_string(),
            file_type: "unknown".to_string(),
            size: -1,
        }
    }
}

/// One classified anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Trimmed anchor text, falling back to the raw href
    pub title: String,
    /// Resolved absolute URL (external hrefs pass through unchanged)
    pub src: String,
    /// Whether the href carried an explicit http(s) scheme
    pub is_external: bool,
}
