//! Weighted pairwise similarity.
//!
//! Weights are kept in hundredths so the sum can be checked at compile time.
//! Attributes that do not contribute for a pair drop out of both the
//! numerator and the denominator, so sparse records are not penalized for
//! what they lack.

use produp_core::CatalogRecord;
use serde::Serialize;

use crate::comparators::Attribute;

// ---------------------------------------------------------------------------
// Weight constants (hundredths, must sum to exactly 100)
// ---------------------------------------------------------------------------

pub const W_NAME: u32 = 40;
pub const W_SKU: u32 = 30;
pub const W_PRICE: u32 = 15;
pub const W_CATEGORY: u32 = 10;
pub const W_IMAGE: u32 = 5;

const _: () = assert!(
    W_NAME + W_SKU + W_PRICE + W_CATEGORY + W_IMAGE == 100,
    "similarity weights must sum to exactly 100"
);

impl Attribute {
    /// Weight of this attribute as a fraction of 1.0.
    #[must_use]
    pub fn weight(self) -> f64 {
        let hundredths = match self {
            Attribute::Name => W_NAME,
            Attribute::Sku => W_SKU,
            Attribute::Price => W_PRICE,
            Attribute::Category => W_CATEGORY,
            Attribute::Image => W_IMAGE,
        };
        f64::from(hundredths) / 100.0
    }
}

/// One attribute's part in a pairwise score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttributeMatch {
    pub attribute: Attribute,
    pub weight: f64,
    /// `None` when the attribute did not contribute.
    pub score: Option<f64>,
}

/// Per-attribute comparison of `a` and `b`, in [`Attribute::ALL`] order.
#[must_use]
pub fn breakdown(a: &CatalogRecord, b: &CatalogRecord) -> Vec<AttributeMatch> {
    Attribute::ALL
        .iter()
        .map(|&attribute| AttributeMatch {
            attribute,
            weight: attribute.weight(),
            score: attribute.compare(a, b),
        })
        .collect()
}

/// Aggregate similarity of `a` and `b` in `[0, 1]`.
///
/// Returns `0.0` when no attribute contributes.
#[must_use]
pub fn similarity(a: &CatalogRecord, b: &CatalogRecord) -> f64 {
    let (numerator, denominator) = Attribute::ALL.iter().fold(
        (0.0_f64, 0.0_f64),
        |(num, den), &attribute| match attribute.compare(a, b) {
            Some(score) => {
                let weight = attribute.weight();
                (num + weight * score, den + weight)
            }
            None => (num, den),
        },
    );

    if denominator > 0.0 {
        (numerator / denominator).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use produp_core::{ProductSnapshot, Source};

    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn record(snapshot: ProductSnapshot) -> CatalogRecord {
        CatalogRecord::new(Source::PrimaryCatalog, snapshot)
    }

    fn full(name: &str, sku: &str, price: f64) -> ProductSnapshot {
        ProductSnapshot {
            id: sku.to_string(),
            name: name.to_string(),
            sku: Some(sku.to_string()),
            price,
            category: Some("Electronics".to_string()),
            image_urls: vec![format!("https://cdn.example.com/{sku}.jpg")],
            ..ProductSnapshot::default()
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = Attribute::ALL.iter().map(|a| a.weight()).sum();
        assert!(approx_eq(sum, 1.0), "weights must sum to 1.0, got {sum}");
    }

    #[test]
    fn name_only_pair_scores_on_name_alone() {
        let a = record(ProductSnapshot {
            name: "Wireless Mouse X200".to_string(),
            ..ProductSnapshot::default()
        });
        let b = record(ProductSnapshot {
            name: "Wireless Mouse X2OO".to_string(),
            ..ProductSnapshot::default()
        });
        assert!(approx_eq(similarity(&a, &b), 1.0 - 2.0 / 19.0));
    }

    #[test]
    fn nothing_comparable_scores_zero() {
        let a = record(ProductSnapshot::default());
        let b = record(ProductSnapshot::default());
        assert!(approx_eq(similarity(&a, &b), 0.0));
    }

    #[test]
    fn sku_mismatch_pulls_score_down() {
        let a = record(full("Desk Lamp", "A-1", 30.0));
        let b = record(ProductSnapshot {
            image_urls: a.product().image_urls.clone(),
            ..full("Desk Lamp", "B-2", 30.0)
        });
        // name 0.40 + price 0.15 + category 0.10 + image 0.05 match; sku 0.30 misses.
        assert!(approx_eq(similarity(&a, &b), 0.70));
    }

    #[test]
    fn breakdown_lists_every_attribute() {
        let a = record(full("Desk Lamp", "A-1", 30.0));
        let b = record(ProductSnapshot {
            price: 0.0,
            ..full("Desk Lamp", "A-1", 30.0)
        });
        let parts = breakdown(&a, &b);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].attribute, Attribute::Name);
        assert_eq!(parts[0].score, Some(1.0));
        assert_eq!(parts[2].attribute, Attribute::Price);
        assert!(parts[2].score.is_none());
    }

    #[test]
    fn all_matching_attributes_score_one() {
        let a = record(full("Wireless Mouse X200", "WMX-200", 19.99));
        let b = record(full("Wireless Mouse X200", "WMX-200", 19.99));
        assert!(approx_eq(similarity(&a, &b), 1.0));
    }
}
