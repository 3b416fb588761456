//! Checkout delivery-option filtering for shipping tests
//!
//! Shipping rates are configured once per variant with a tag at the end of
//! the title, e.g. `"Standard Shipping (A)"`. A shopper only sees the rates
//! tagged with their assigned variant plus any untagged rates.

use serde::{Deserialize, Serialize};

/// Cart attribute holding the visitor's variant suffix
pub const SHIPPING_SUFFIX_ATTRIBUTE: &str = "_ab_shipping_suffix";

#[derive(Debug, Clone, Deserialize)]
pub struct CartAttribute {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    /// Present when the line is purchased on a subscription plan
    #[serde(default)]
    pub selling_plan_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryOption {
    pub handle: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryGroup {
    #[serde(default)]
    pub delivery_options: Vec<DeliveryOption>,
}

/// Checkout snapshot sent by the storefront
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryCart {
    #[serde(default)]
    pub attributes: Vec<CartAttribute>,
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub delivery_groups: Vec<DeliveryGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HideOperation {
    pub delivery_option_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOperation {
    pub hide: HideOperation,
}

impl DeliveryCart {
    fn shipping_variant(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == SHIPPING_SUFFIX_ATTRIBUTE)
            .and_then(|a| a.value.as_deref())
            .filter(|v| !v.is_empty())
    }

    fn has_subscription(&self) -> bool {
        self.lines.iter().any(|line| line.selling_plan_id.is_some())
    }
}

/// Extracts the variant tag from a title ending in `" (X)"`
///
/// X must be a single ASCII alphanumeric character.
pub fn extract_variant_suffix(title: &str) -> Option<&str> {
    let bytes = title.as_bytes();
    let len = bytes.len();
    if len < 4 {
        return None;
    }

    if bytes[len - 1] == b')' && bytes[len - 3] == b'(' && bytes[len - 4] == b' ' {
        let variant = bytes[len - 2];
        if variant.is_ascii_alphanumeric() {
            return Some(&title[len - 2..len - 1]);
        }
    }

    None
}

/// True when the option is tagged for a different variant
///
/// Untagged options (e.g. "Express Shipping") are shown to everyone. Suffixes
/// compare case-insensitively, matching how they are stored.
pub fn should_hide_option(title: &str, variant: &str) -> bool {
    extract_variant_suffix(title).is_some_and(|suffix| !suffix.eq_ignore_ascii_case(variant.trim()))
}

/// Builds hide operations for every option the shopper should not see
///
/// Carts without an assigned variant see all rates. Subscription carts are
/// excluded from the test and also see all rates.
pub fn filter_delivery_options(cart: &DeliveryCart) -> Vec<DeliveryOperation> {
    let Some(variant) = cart.shipping_variant() else {
        return Vec::new();
    };

    if cart.has_subscription() {
        return Vec::new();
    }

    cart.delivery_groups
        .iter()
        .flat_map(|group| group.delivery_options.iter())
        .filter(|option| should_hide_option(&option.title, variant))
        .map(|option| DeliveryOperation {
            hide: HideOperation {
                delivery_option_handle: option.handle.clone(),
            },
        })
        .collect()
}
