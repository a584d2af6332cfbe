//! Ultimate Guitar chord source (fetch-by-URL)
//!
//! Serves only queries carrying a URL on `ultimate-guitar.com` (any
//! subdomain), taken from either the content or the embed field. The page's embedded application state is preferred; when it is
//! missing the known tab containers are scraped instead.
//!
//! # Locators (in order)
//! 1. [`EmbeddedJsonLocator`]: `window.UGAPP_DATA` or `.js-store[data-content]`
//! 2. [`SelectorLocator`] over [`TAB_CONTAINER_SELECTORS`], > 100 characters

use crate::extractors::locator::{
    locate_first, ContentLocator, EmbeddedJsonLocator, SelectorLocator, TAB_CONTAINER_SELECTORS,
};
use crate::http::{FetchRequest, HttpTransport};
use crate::types::{parse_absolute_url, ChordQuery, ChordSource, ExtractionError, Provenance};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Registered domain of the tab site
const UG_DOMAIN: &str = "ultimate-guitar.com";

/// Container text must be longer than this
const MIN_CONTAINER_CHARS: usize = 100;

/// Whether a URL points at the Ultimate Guitar site
pub fn is_ultimate_guitar_url(url: &str) -> bool {
    parse_absolute_url(url)
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| host == UG_DOMAIN || host.ends_with(&format!(".{}", UG_DOMAIN)))
}

/// Ultimate Guitar client
pub struct UltimateGuitarClient {
    transport: Arc<dyn HttpTransport>,
    locators: Vec<Box<dyn ContentLocator>>,
}

impl UltimateGuitarClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            locators: vec![
                Box::new(EmbeddedJsonLocator),
                Box::new(SelectorLocator::new(
                    TAB_CONTAINER_SELECTORS,
                    MIN_CONTAINER_CHARS,
                )),
            ],
        }
    }

    /// Fetch and extract one tab page
    pub async fn fetch_url(&self, url: &str) -> Result<String, ExtractionError> {
        if !is_ultimate_guitar_url(url) {
            return Err(ExtractionError::Unsupported(format!(
                "Not an Ultimate Guitar URL: {}",
                url
            )));
        }

        info!(url = %url, "Fetching Ultimate Guitar tab page");

        let request = FetchRequest::get(url.trim()).browser_navigation();
        let response = self.transport.fetch(request).await?;
        if !response.is_success() {
            return Err(ExtractionError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }

        locate_first(&self.locators, &response.body).ok_or_else(|| {
            ExtractionError::Parse(format!("Could not extract tab content from {}", url))
        })
    }
}

#[async_trait]
impl ChordSource for UltimateGuitarClient {
    fn provenance(&self) -> Provenance {
        Provenance::UltimateGuitar
    }

    fn applies_to(&self, query: &ChordQuery) -> bool {
        query.tab_url.is_some()
    }

    async fn fetch(&self, query: &ChordQuery) -> Result<String, ExtractionError> {
        let url = query.tab_url.as_deref().ok_or_else(|| {
            ExtractionError::Unsupported("Query carries no Ultimate Guitar URL".to_string())
        })?;
        self.fetch_url(url).await
    }
}
