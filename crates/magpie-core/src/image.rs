//! Image reference resolution
//!
//! For one `<img>` reference: pick a source attribute, normalize it, fetch
//! the bytes through the relay, and derive size plus file type. Failures are
//! the caller's to absorb; a single image must never sink the whole page.

use crate::normalize::normalize;
use crate::relay::RelayClient;
use crate::{Image, MagpieError, Result};
use tracing::debug;

/// Source attributes captured from one `<img>` element.
///
/// Attributes that were present but empty are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSource {
    pub src: Option<String>,
    pub data_src: Option<String>,
    pub data_fallback_src: Option<String>,
}

impl ImageSource {
    /// Select the source attribute to resolve.
    ///
    /// Without the fallback only `src` is considered; with it, `src`, then
    /// `data-src`, then `data-fallback-src`, in that priority order.
    pub fn candidate(&self, use_data_fallback: bool) -> Option<&str> {
        if use_data_fallback {
            self.src
                .as_deref()
                .or(self.data_src.as_deref())
                .or(self.data_fallback_src.as_deref())
        } else {
            self.src.as_deref()
        }
    }
}

/// Resolve one image reference through the relay.
///
/// A reference with no usable source yields [`Image::empty`] without any
/// network round trip; the caller counts those rather than treating them as
/// errors. Otherwise the candidate is normalized ([`MagpieError::InvalidImageUrl`]
/// on failure) and fetched as bytes ([`MagpieError::ImageFetch`] on a
/// non-success relayed status).
pub async fn resolve_image(
    relay: &RelayClient,
    id: u64,
    source: &ImageSource,
    use_data_fallback: bool,
) -> Result<Image> {
    let Some(candidate) = source.candidate(use_data_fallback) else {
        return Ok(Image::empty(id));
    };

    let url = normalize(candidate)
        .ok_or_else(|| MagpieError::InvalidImageUrl(candidate.to_string()))?;

    let response = relay.fetch_bytes(&url).await?;
    if !response.is_success() {
        return Err(MagpieError::ImageFetch {
            url,
            status: response.status,
        });
    }

    let size = response.body.len() as i64;
    let file_type = derive_file_type(&url);
    debug!("Resolved image {} ({} bytes, {})", url, size, file_type);

    Ok(Image {
        id,
        src: url,
        file_type,
        size,
    })
}

/// Derive a file type from a resolved URL: strip query string and fragment,
/// then take whatever follows the final `.` of the remaining string,
/// lower-cased. `"unknown"` when there is no usable extension.
pub fn derive_file_type(url: &str) -> String {
    let stripped = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    match stripped.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => "unknown".to_string(),
    }
}
