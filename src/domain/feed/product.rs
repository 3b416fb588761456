use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog record for one sellable item, as stored per tenant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedProduct {
    pub id: String,
    pub variant_id: Option<String>,
    pub item_group_id: Option<String>,
    pub title: String,
    pub description: String,
    pub handle: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub currency: String,
    pub image_url: Option<String>,
    pub additional_images: Vec<String>,
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub brand: Option<String>,
    pub inventory_quantity: i32,
    /// Keep selling when out of stock
    pub inventory_policy_continue: bool,
    /// `active`, `draft` or `archived`
    pub status: String,
    pub product_type: Option<String>,
    pub google_product_category: Option<String>,
    pub condition: Option<String>,
    pub weight_grams: Option<i32>,
}

/// Per-tenant feed settings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedSettings {
    pub store_url: String,
    pub store_name: String,
    pub default_brand: Option<String>,
    pub include_out_of_stock: bool,
}

/// One `<item>` in the Google Merchant feed
///
/// Field names mirror Google's `g:` attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleFeedItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub image_link: String,
    pub additional_image_links: Vec<String>,
    pub availability: Availability,
    pub price: String,
    pub sale_price: Option<String>,
    pub brand: String,
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub identifier_exists: bool,
    pub condition: Condition,
    pub google_product_category: Option<String>,
    pub product_type: Option<String>,
    pub item_group_id: Option<String>,
    pub shipping_weight: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Backorder,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::Backorder => "backorder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Refurbished,
    Used,
}

impl Condition {
    /// Parses a catalog condition; unknown values are treated as new
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("refurbished") => Condition::Refurbished,
            Some("used") => Condition::Used,
            _ => Condition::New,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Refurbished => "refurbished",
            Condition::Used => "used",
        }
    }
}
