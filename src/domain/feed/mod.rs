// Google Merchant feed domain module
// Maps tenant catalog records to Google's documented fields and renders RSS

pub mod gtin;
pub mod mapping;
pub mod product;
pub mod xml;

use serde::Serialize;
use thiserror::Error;

pub use mapping::{map_product, SkippedProduct};
pub use product::{FeedProduct, FeedSettings, GoogleFeedItem};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Unknown store: {0}")]
    UnknownTenant(String),

    #[error("Feed settings are not configured for this store")]
    NotConfigured,

    #[error("Failed to load catalog: {0}")]
    Catalog(String),
}

/// Generated feed document with a summary of what was left out
#[derive(Debug, Clone, Serialize)]
pub struct FeedReport {
    #[serde(skip)]
    pub xml: String,
    pub included: usize,
    pub skipped: Vec<SkippedProduct>,
    pub warnings: Vec<String>,
}

/// Maps every product and renders the feed
pub fn generate_feed(products: &[FeedProduct], settings: &FeedSettings) -> FeedReport {
    let mut items = Vec::with_capacity(products.len());
    let mut skipped = Vec::new();
    let mut warnings = Vec::new();

    for product in products {
        match map_product(product, settings) {
            Ok(mapped) => {
                warnings.extend(
                    mapped
                        .warnings
                        .into_iter()
                        .map(|w| format!("{}: {}", mapped.item.id, w)),
                );
                items.push(mapped.item);
            }
            Err(skip) => skipped.push(skip),
        }
    }

    FeedReport {
        xml: xml::render_rss(&items, settings),
        included: items.len(),
        skipped,
        warnings,
    }
}
