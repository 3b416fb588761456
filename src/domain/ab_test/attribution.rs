// Order attribution for shipping tests

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::ab_test::{AbTest, AbVariant};
use super::delivery::SHIPPING_SUFFIX_ATTRIBUTE;

/// Note attribute carrying the test id on the order
pub const TEST_ID_ATTRIBUTE: &str = "_ab_test_id";

/// Why an order could not be attributed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributionError {
    #[error("Order carries no shipping test attributes")]
    NotInTest,

    #[error("Invalid test id on order: {0}")]
    InvalidTestId(String),

    #[error("Order belongs to test {found}, expected {expected}")]
    TestMismatch { expected: Uuid, found: Uuid },

    #[error("No variant with suffix '{0}' in this test")]
    UnknownVariant(String),

    #[error("Test no longer accepts attribution")]
    TestClosed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    pub value: String,
}

/// Order data needed for attribution, as delivered by the order webhook
#[derive(Debug, Clone, Deserialize)]
pub struct OrderForAttribution {
    pub order_id: String,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
    /// Merchandise revenue after discounts, before shipping and tax
    pub product_revenue: Decimal,
    /// Shipping actually charged on the order
    pub actual_shipping_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl OrderForAttribution {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.note_attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.trim())
            .filter(|v| !v.is_empty())
    }

    /// Test id recorded on the order, if any
    pub fn test_id(&self) -> Result<Option<Uuid>, AttributionError> {
        self.attribute(TEST_ID_ATTRIBUTE)
            .map(|raw| Uuid::parse_str(raw).map_err(|_| AttributionError::InvalidTestId(raw.into())))
            .transpose()
    }
}

/// A single attributed order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingAttribution {
    pub id: Uuid,
    pub test_id: Uuid,
    pub variant_id: Uuid,
    pub order_id: String,
    pub product_revenue: Decimal,
    pub expected_shipping_price: Decimal,
    pub actual_shipping_price: Decimal,
    pub net_revenue: Decimal,
    /// The shopper paid a different shipping price than their variant offers
    pub is_mismatch: bool,
    pub currency: String,
}

/// Attributes an order to the variant named by its note attributes
///
/// `net_revenue = product_revenue - actual_shipping_price`. Price mismatches
/// are recorded rather than rejected so they show up in results.
pub fn attribute_shipping_order(
    order: &OrderForAttribution,
    test: &AbTest,
    variants: &[AbVariant],
) -> Result<ShippingAttribution, AttributionError> {
    let (Some(test_id), Some(suffix)) = (order.test_id()?, order.attribute(SHIPPING_SUFFIX_ATTRIBUTE))
    else {
        return Err(AttributionError::NotInTest);
    };

    if test_id != test.id() {
        return Err(AttributionError::TestMismatch {
            expected: test.id(),
            found: test_id,
        });
    }

    if !test.status().accepts_attribution() {
        return Err(AttributionError::TestClosed);
    }

    let variant = variants
        .iter()
        .find(|v| v.suffix.to_string().eq_ignore_ascii_case(suffix))
        .ok_or_else(|| AttributionError::UnknownVariant(suffix.to_string()))?;

    let is_mismatch = order.actual_shipping_price != variant.shipping_price;
    if is_mismatch {
        tracing::warn!(
            order_id = %order.order_id,
            test_id = %test.id(),
            variant = %variant.suffix,
            expected = %variant.shipping_price,
            actual = %order.actual_shipping_price,
            "Shipping price mismatch on attributed order"
        );
    }

    Ok(ShippingAttribution {
        id: Uuid::new_v4(),
        test_id: test.id(),
        variant_id: variant.id,
        order_id: order.order_id.clone(),
        product_revenue: order.product_revenue,
        expected_shipping_price: variant.shipping_price,
        actual_shipping_price: order.actual_shipping_price,
        net_revenue: order.product_revenue - order.actual_shipping_price,
        is_mismatch,
        currency: order.currency.clone(),
    })
}
