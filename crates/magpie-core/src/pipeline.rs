//! The page extraction pipeline
//!
//! Orchestrates one inspection: validate the input, fetch the document
//! through the relay, parse it, resolve every image sequentially while
//! reporting progress, classify every anchor, persist the page, and hand the
//! assembled report back. The pipeline is not re-entrant; callers run one
//! inspection at a time.

use crate::extract;
use crate::history::{HistoryStore, Store};
use crate::image::{self, ImageSource};
use crate::link::{classify_link, InternalLinkPolicy};
use crate::normalize::normalize;
use crate::relay::RelayClient;
use crate::{Image, MagpieError, Page, Result};
use tracing::{info, warn};
use url::Url;

/// Title reported when the document has no non-empty `<title>`.
pub const NO_TITLE: &str = "No title found";

/// Pipeline stages, reported in order through the observer. `Persisting` is
/// only reached on success; failures before it leave history untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    FetchingDocument,
    Parsing,
    EnumeratingImages,
    EnumeratingLinks,
    Persisting,
    Done,
}

/// Observer events emitted during one inspection.
///
/// `ImageLoaded` fires exactly once per discovered `<img>`, in document
/// order, with a strictly increasing `loaded` ending at `total`. That
/// ordering is part of the contract, not an implementation detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectEvent {
    Stage(Stage),
    ImageLoaded { loaded: usize, total: usize },
}

/// Per-inspection settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectConfig {
    /// Also consult data-src / data-fallback-src when src is unusable
    pub use_data_fallback: bool,
    /// How internal hrefs are rewritten
    pub link_policy: InternalLinkPolicy,
}

/// Runs inspections against one relay, persisting results into an injected
/// history store.
pub struct Inspector<S: Store> {
    relay: RelayClient,
    history: HistoryStore<S>,
    config: InspectConfig,
}

impl<S: Store> Inspector<S> {
    pub fn new(relay: RelayClient, history: HistoryStore<S>, config: InspectConfig) -> Self {
        Self {
            relay,
            history,
            config,
        }
    }

    /// The history this inspector persists into.
    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Inspect one page. `emit` observes stage transitions and per-image
    /// completions; pass a no-op closure when progress is not interesting.
    pub async fn inspect<F>(&mut self, input: &str, mut emit: F) -> Result<Page>
    where
        F: FnMut(InspectEvent),
    {
        emit(InspectEvent::Stage(Stage::Validating));
        let url = normalize(input).ok_or_else(|| MagpieError::InvalidUrl(input.to_string()))?;
        info!("Inspecting {}", url);

        emit(InspectEvent::Stage(Stage::FetchingDocument));
        let response = self.relay.fetch_text(&url).await?;
        if !response.is_success() {
            return Err(MagpieError::DocumentFetch {
                url,
                status: response.status,
            });
        }

        emit(InspectEvent::Stage(Stage::Parsing));
        let document = extract::parse_document(&response.body);
        let base = Url::parse(&url)?;

        let mut page = Page {
            title: document.title.unwrap_or_else(|| NO_TITLE.to_string()),
            url: url.clone(),
            images: Vec::new(),
            images_not_found: 0,
            internal_links: Vec::new(),
            external_links: Vec::new(),
            total_image_count: document.images.len(),
        };

        emit(InspectEvent::Stage(Stage::EnumeratingImages));
        let total = document.images.len();
        for (index, source) in document.images.iter().enumerate() {
            self.resolve_into(&mut page, index as u64, source).await;
            emit(InspectEvent::ImageLoaded {
                loaded: index + 1,
                total,
            });
        }

        emit(InspectEvent::Stage(Stage::EnumeratingLinks));
        for anchor in &document.anchors {
            let link = classify_link(anchor, &base, self.config.link_policy);
            if link.is_external {
                page.external_links.push(link);
            } else {
                page.internal_links.push(link);
            }
        }

        emit(InspectEvent::Stage(Stage::Persisting));
        self.history.append(&page)?;

        emit(InspectEvent::Stage(Stage::Done));
        info!(
            "Inspected {}: {} images ({} without source), {} internal / {} external links",
            page.url,
            page.total_image_count,
            page.images_not_found,
            page.internal_links.len(),
            page.external_links.len()
        );
        Ok(page)
    }

    /// Resolve one image reference into the page being assembled. No-source
    /// references are counted; failures record a placeholder so enumeration
    /// order and count survive.
    async fn resolve_into(&self, page: &mut Page, id: u64, source: &ImageSource) {
        let fallback = self.config.use_data_fallback;
        match image::resolve_image(&self.relay, id, source, fallback).await {
            Ok(image) if image.src.is_empty() => page.images_not_found += 1,
            Ok(image) => page.images.push(image),
            Err(err) => {
                let candidate = source.candidate(fallback).unwrap_or_default();
                warn!("Image {:?} failed to resolve: {}", candidate, err);
                page.images.push(Image::placeholder(id, candidate));
            }
        }
    }
}
