//! Anchor classification
//!
//! Externality is a literal scheme-prefix test on the raw href, decided
//! before any rewriting. Internal hrefs are rewritten against the page's
//! origin; which rewrite applies is a policy choice because the two
//! historical behaviors disagree.

use crate::extract::AnchorRef;
use crate::Link;
use url::Url;

/// How internal hrefs become absolute URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InternalLinkPolicy {
    /// Origin (scheme + host) concatenated with the raw href. Hrefs that are
    /// not absolute paths produce URLs that drop the page's own path.
    #[default]
    OriginOnly,
    /// RFC 3986 join against the page URL, preserving relative navigation.
    Resolve,
}

/// Classify one anchor against the page base URL.
pub fn classify_link(anchor: &AnchorRef, base: &Url, policy: InternalLinkPolicy) -> Link {
    let href = anchor.href.as_str();
    // Literal prefix test: scheme-relative and protocol-less hrefs count as
    // internal.
    let is_external = href.starts_with("http://") || href.starts_with("https://");

    let title = {
        let text = anchor.text.trim();
        if text.is_empty() {
            href.to_string()
        } else {
            text.to_string()
        }
    };

    let src = if is_external {
        href.to_string()
    } else {
        match policy {
            InternalLinkPolicy::OriginOnly => format!("{}{}", origin_of(base), href),
            InternalLinkPolicy::Resolve => base
                .join(href)
                .map(String::from)
                .unwrap_or_else(|_| href.to_string()),
        }
    };

    Link {
        title,
        src,
        is_external,
    }
}

/// Scheme + host (+ non-default port) of a URL, without a trailing slash.
fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}
