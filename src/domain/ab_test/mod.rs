// Shipping A/B test domain module
// Test aggregate, visitor assignment, checkout filtering, order attribution and results

#![allow(clippy::module_inception)]

pub mod assignment;
pub mod attribution;
pub mod delivery;
pub mod results;
pub mod value_objects;

// Re-export main types for convenience
pub use ab_test::{AbTest, AbTestError, AbVariant, NewVariant};
pub use attribution::{attribute_shipping_order, AttributionError, OrderForAttribution, ShippingAttribution};
pub use value_objects::{AbTestStatus, VariantSuffix};
