// Tenant catalog record -> Google Merchant item

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::gtin::normalize_gtin;
use super::product::{Availability, Condition, FeedProduct, FeedSettings, GoogleFeedItem};

pub const MAX_TITLE_LENGTH: usize = 150;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;
pub const MAX_ADDITIONAL_IMAGES: usize = 10;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// A mapped item plus non-fatal problems found along the way
#[derive(Debug, Clone, PartialEq)]
pub struct MappedItem {
    pub item: GoogleFeedItem,
    pub warnings: Vec<String>,
}

/// A product left out of the feed and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedProduct {
    pub id: String,
    pub reasons: Vec<String>,
}

/// Strips tags and common entities, collapsing whitespace
pub fn strip_html(input: &str) -> String {
    let without_tags = HTML_TAG.replace_all(input, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

fn format_price(amount: Decimal, currency: &str) -> String {
    format!("{:.2} {}", amount.round_dp(2), currency.trim().to_uppercase())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn availability(product: &FeedProduct) -> Availability {
    if product.inventory_quantity > 0 {
        Availability::InStock
    } else if product.inventory_policy_continue {
        Availability::Backorder
    } else {
        Availability::OutOfStock
    }
}

/// Maps a catalog product to a feed item, or explains why it is skipped
pub fn map_product(
    product: &FeedProduct,
    settings: &FeedSettings,
) -> Result<MappedItem, SkippedProduct> {
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();

    if !product.status.eq_ignore_ascii_case("active") {
        reasons.push(format!("Product status is '{}'", product.status));
    }

    let title = truncate_chars(product.title.trim(), MAX_TITLE_LENGTH);
    if title.is_empty() {
        reasons.push("Missing title".to_string());
    }

    let image_link = non_blank(&product.image_url);
    if image_link.is_none() {
        reasons.push("Missing image".to_string());
    }

    if product.price <= Decimal::ZERO {
        reasons.push("Price must be greater than zero".to_string());
    }

    let availability = availability(product);
    if availability == Availability::OutOfStock && !settings.include_out_of_stock {
        reasons.push("Out of stock".to_string());
    }

    let id = product
        .variant_id
        .clone()
        .unwrap_or_else(|| product.id.clone());

    let (Some(image_link), true) = (image_link, reasons.is_empty()) else {
        return Err(SkippedProduct { id, reasons });
    };

    let mut description = truncate_chars(&strip_html(&product.description), MAX_DESCRIPTION_LENGTH);
    if description.is_empty() {
        description = title.clone();
    }

    let base_url = settings.store_url.trim_end_matches('/');
    let link = match &product.variant_id {
        Some(variant_id) => format!("{}/products/{}?variant={}", base_url, product.handle, variant_id),
        None => format!("{}/products/{}", base_url, product.handle),
    };

    let mut additional_image_links: Vec<String> = Vec::new();
    for url in product.additional_images.iter().map(|u| u.trim()) {
        if !url.is_empty() && url != image_link && !additional_image_links.iter().any(|u| u == url) {
            additional_image_links.push(url.to_string());
        }
    }
    if additional_image_links.len() > MAX_ADDITIONAL_IMAGES {
        warnings.push(format!(
            "Only the first {} additional images are included",
            MAX_ADDITIONAL_IMAGES
        ));
        additional_image_links.truncate(MAX_ADDITIONAL_IMAGES);
    }

    let (price, sale_price) = match product.compare_at_price {
        Some(compare_at) if compare_at > product.price => (
            format_price(compare_at, &product.currency),
            Some(format_price(product.price, &product.currency)),
        ),
        _ => (format_price(product.price, &product.currency), None),
    };

    let gtin = match non_blank(&product.gtin) {
        Some(raw) => {
            let normalized = normalize_gtin(&raw);
            if normalized.is_none() {
                warnings.push(format!("Dropped invalid GTIN '{}'", raw));
            }
            normalized
        }
        None => None,
    };
    let mpn = non_blank(&product.mpn);

    let brand = non_blank(&product.brand)
        .or_else(|| non_blank(&settings.default_brand))
        .unwrap_or_else(|| settings.store_name.clone());

    Ok(MappedItem {
        item: GoogleFeedItem {
            id,
            title,
            description,
            link,
            image_link,
            additional_image_links,
            availability,
            price,
            sale_price,
            brand,
            identifier_exists: gtin.is_some() || mpn.is_some(),
            gtin,
            mpn,
            condition: Condition::parse(product.condition.as_deref()),
            google_product_category: non_blank(&product.google_product_category),
            product_type: non_blank(&product.product_type),
            item_group_id: non_blank(&product.item_group_id),
            shipping_weight: product
                .weight_grams
                .filter(|g| *g > 0)
                .map(|g| format!("{} g", g)),
        },
        warnings,
    })
}
