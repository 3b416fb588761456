// Per-variant results with NRPV (net revenue per visitor) as the primary metric

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::value_objects::VariantSuffix;

/// Raw aggregates for one variant, as summed by the database
#[derive(Debug, Clone, PartialEq)]
pub struct VariantStats {
    pub variant_id: Uuid,
    pub name: String,
    pub suffix: VariantSuffix,
    pub is_control: bool,
    pub visitors: i64,
    pub orders: i64,
    pub product_revenue: Decimal,
    pub shipping_revenue: Decimal,
    pub net_revenue: Decimal,
    pub mismatches: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantResult {
    pub variant_id: Uuid,
    pub name: String,
    pub suffix: VariantSuffix,
    pub is_control: bool,
    pub visitors: i64,
    pub orders: i64,
    pub product_revenue: Decimal,
    pub shipping_revenue: Decimal,
    pub net_revenue: Decimal,
    pub nrpv: Decimal,
    pub conversion_rate: Decimal,
    pub mismatches: i64,
    /// Relative NRPV change against the control, e.g. 0.125 = +12.5%
    pub nrpv_lift: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResults {
    pub test_id: Uuid,
    pub variants: Vec<VariantResult>,
    pub total_visitors: i64,
    pub total_orders: i64,
    /// Variant with the highest NRPV, when any visitors were recorded
    pub leader: Option<VariantSuffix>,
}

fn per_visitor(value: Decimal, visitors: i64) -> Decimal {
    if visitors <= 0 {
        return Decimal::ZERO;
    }
    (value / Decimal::from(visitors)).round_dp(4)
}

/// Computes NRPV, conversion and lift for every variant of a test
pub fn compute_results(test_id: Uuid, stats: Vec<VariantStats>) -> TestResults {
    let control_nrpv = stats
        .iter()
        .find(|s| s.is_control)
        .map(|s| per_visitor(s.net_revenue, s.visitors));

    let mut variants: Vec<VariantResult> = stats
        .into_iter()
        .map(|s| {
            let nrpv = per_visitor(s.net_revenue, s.visitors);
            let nrpv_lift = match control_nrpv {
                Some(control) if !s.is_control && !control.is_zero() => {
                    Some(((nrpv - control) / control).round_dp(4))
                }
                _ => None,
            };

            VariantResult {
                variant_id: s.variant_id,
                conversion_rate: per_visitor(Decimal::from(s.orders), s.visitors),
                nrpv,
                nrpv_lift,
                name: s.name,
                suffix: s.suffix,
                is_control: s.is_control,
                visitors: s.visitors,
                orders: s.orders,
                product_revenue: s.product_revenue,
                shipping_revenue: s.shipping_revenue,
                net_revenue: s.net_revenue,
                mismatches: s.mismatches,
            }
        })
        .collect();

    variants.sort_by_key(|v| v.suffix);

    let total_visitors = variants.iter().map(|v| v.visitors).sum();
    let total_orders = variants.iter().map(|v| v.orders).sum();
    let leader = variants
        .iter()
        .filter(|v| v.visitors > 0)
        .max_by_key(|v| v.nrpv)
        .map(|v| v.suffix);

    TestResults {
        test_id,
        variants,
        total_visitors,
        total_orders,
        leader,
    }
}
