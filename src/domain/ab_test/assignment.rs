// Deterministic visitor-to-variant bucketing

use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::ab_test::AbVariant;

/// Maps a visitor onto a bucket in `0..100`
///
/// The same `(test_id, visitor_id)` pair always lands in the same bucket, so
/// a visitor keeps their arm even before the assignment row is persisted.
pub fn bucket_for(test_id: Uuid, visitor_id: &str) -> u8 {
    let digest = Sha256::digest(format!("{}:{}", test_id, visitor_id).as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % 100) as u8
}

/// Picks the variant for a visitor by walking cumulative traffic weights
///
/// Variants are considered in suffix order so the result does not depend on
/// how the caller happened to sort them.
pub fn assign_variant<'a>(
    test_id: Uuid,
    visitor_id: &str,
    variants: &'a [AbVariant],
) -> Option<&'a AbVariant> {
    let mut ordered: Vec<&AbVariant> = variants.iter().collect();
    ordered.sort_by_key(|v| v.suffix);

    let bucket = i32::from(bucket_for(test_id, visitor_id));
    let mut cumulative = 0;
    for variant in &ordered {
        cumulative += variant.traffic_weight;
        if bucket < cumulative {
            return Some(variant);
        }
    }

    // Weights summing below 100 (legacy rows) fall through to the last arm
    ordered.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ab_test::VariantSuffix;
    use rust_decimal::Decimal;

    fn variant(test_id: Uuid, suffix: &str, weight: i32) -> AbVariant {
        AbVariant {
            id: Uuid::new_v4(),
            test_id,
            name: suffix.to_string(),
            suffix: VariantSuffix::parse(suffix).unwrap(),
            shipping_price: Decimal::ZERO,
            traffic_weight: weight,
            is_control: suffix == "A",
        }
    }

    #[test]
    fn bucket_in_range_and_stable() {
        let test_id = Uuid::new_v4();
        for i in 0..200 {
            let visitor = format!("visitor-{i}");
            let bucket = bucket_for(test_id, &visitor);
            assert!(bucket < 100);
            assert_eq!(bucket, bucket_for(test_id, &visitor));
        }
    }

    #[test]
    fn assignment_is_deterministic() {
        let test_id = Uuid::new_v4();
        let variants = vec![variant(test_id, "A", 50), variant(test_id, "B", 50)];

        let first = assign_variant(test_id, "visitor-42", &variants).unwrap().id;
        let second = assign_variant(test_id, "visitor-42", &variants).unwrap().id;
        assert_eq!(first, second);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let test_id = Uuid::new_v4();
        let a = variant(test_id, "A", 30);
        let b = variant(test_id, "B", 70);
        let forward = vec![a.clone(), b.clone()];
        let reversed = vec![b, a];

        for i in 0..50 {
            let visitor = format!("v{i}");
            assert_eq!(
                assign_variant(test_id, &visitor, &forward).unwrap().id,
                assign_variant(test_id, &visitor, &reversed).unwrap().id
            );
        }
    }

    #[test]
    fn full_weight_variant_gets_everyone() {
        let test_id = Uuid::new_v4();
        let variants = vec![variant(test_id, "A", 100), variant(test_id, "B", 0)];
        for i in 0..50 {
            let chosen = assign_variant(test_id, &format!("v{i}"), &variants).unwrap();
            assert_eq!(chosen.suffix.as_char(), 'A');
        }
    }

    #[test]
    fn split_roughly_follows_weights() {
        let test_id = Uuid::new_v4();
        let variants = vec![variant(test_id, "A", 50), variant(test_id, "B", 50)];
        let a_count = (0..2000)
            .filter(|i| {
                assign_variant(test_id, &format!("visitor-{i}"), &variants)
                    .unwrap()
                    .suffix
                    .as_char()
                    == 'A'
            })
            .count();
        assert!((800..1200).contains(&a_count), "A got {a_count} of 2000");
    }

    #[test]
    fn empty_variants() {
        assert!(assign_variant(Uuid::new_v4(), "v", &[]).is_none());
    }
}
