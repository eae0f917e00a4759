//! Per-attribute comparators.
//!
//! Every comparator returns `Option<f64>`. `None` means the attribute cannot
//! be evaluated for this pair (typically because one side lacks it) and the
//! scorer leaves its weight out entirely. `Some(score)` is a similarity in
//! `[0, 1]`.

use produp_core::CatalogRecord;
use serde::Serialize;

use crate::distance::normalized_similarity;

/// Product attributes that take part in pairwise scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Name,
    Sku,
    Price,
    Category,
    Image,
}

impl Attribute {
    /// All attributes, in descending weight order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Name,
        Attribute::Sku,
        Attribute::Price,
        Attribute::Category,
        Attribute::Image,
    ];

    /// Compare `a` and `b` on this attribute.
    #[must_use]
    pub fn compare(self, a: &CatalogRecord, b: &CatalogRecord) -> Option<f64> {
        match self {
            Attribute::Name => compare_name(a, b),
            Attribute::Sku => compare_sku(a, b),
            Attribute::Price => compare_price(a, b),
            Attribute::Category => compare_category(a, b),
            Attribute::Image => compare_image(a, b),
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Attribute::Name => "name",
            Attribute::Sku => "sku",
            Attribute::Price => "price",
            Attribute::Category => "category",
            Attribute::Image => "image",
        };
        f.write_str(label)
    }
}

/// Edit-distance similarity of the two names.
///
/// Skipped only when both names are blank.
#[must_use]
pub fn compare_name(a: &CatalogRecord, b: &CatalogRecord) -> Option<f64> {
    let (name_a, name_b) = (&a.product().name, &b.product().name);
    if name_a.trim().is_empty() && name_b.trim().is_empty() {
        return None;
    }
    Some(normalized_similarity(name_a, name_b))
}

/// Exact, case-sensitive sku match.
#[must_use]
pub fn compare_sku(a: &CatalogRecord, b: &CatalogRecord) -> Option<f64> {
    let (sku_a, sku_b) = (a.product().sku()?, b.product().sku()?);
    Some(if sku_a == sku_b { 1.0 } else { 0.0 })
}

/// Relative price closeness, `1 - |p1 - p2| / max(p1, p2)`.
#[must_use]
pub fn compare_price(a: &CatalogRecord, b: &CatalogRecord) -> Option<f64> {
    let (p1, p2) = (a.product().price, b.product().price);
    if !(p1 > 0.0 && p2 > 0.0) {
        return None;
    }
    Some(1.0 - (p1 - p2).abs() / p1.max(p2))
}

#[must_use]
pub fn compare_category(a: &CatalogRecord, b: &CatalogRecord) -> Option<f64> {
    let (cat_a, cat_b) = (a.product().category()?, b.product().category()?);
    Some(if cat_a == cat_b { 1.0 } else { 0.0 })
}

/// Identical primary image URL.
#[must_use]
pub fn compare_image(a: &CatalogRecord, b: &CatalogRecord) -> Option<f64> {
    let (img_a, img_b) = (
        a.product().primary_image_url()?,
        b.product().primary_image_url()?,
    );
    Some(if img_a == img_b { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use produp_core::{ProductSnapshot, Source};

    use super::*;

    fn record(snapshot: ProductSnapshot) -> CatalogRecord {
        CatalogRecord::new(Source::PrimaryCatalog, snapshot)
    }

    fn named(name: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: "1".to_string(),
            name: name.to_string(),
            ..ProductSnapshot::default()
        }
    }

    #[test]
    fn name_contributes_when_one_side_is_blank() {
        let a = record(named("Desk Lamp"));
        let b = record(named(""));
        assert_eq!(compare_name(&a, &b), Some(0.0));
    }

    #[test]
    fn name_skipped_when_both_blank() {
        let a = record(named(" "));
        let b = record(named(""));
        assert_eq!(compare_name(&a, &b), None);
    }

    #[test]
    fn sku_requires_both_sides() {
        let a = record(ProductSnapshot {
            sku: Some("WMX-200".to_string()),
            ..named("a")
        });
        let b = record(named("b"));
        assert_eq!(compare_sku(&a, &b), None);
    }

    #[test]
    fn sku_match_is_case_sensitive() {
        let a = record(ProductSnapshot {
            sku: Some("WMX-200".to_string()),
            ..named("a")
        });
        let b = record(ProductSnapshot {
            sku: Some("wmx-200".to_string()),
            ..named("b")
        });
        assert_eq!(compare_sku(&a, &b), Some(0.0));
        assert_eq!(compare_sku(&a, &a), Some(1.0));
    }

    #[test]
    fn price_skipped_when_either_is_unset() {
        let a = record(ProductSnapshot {
            price: 10.0,
            ..named("a")
        });
        let b = record(named("b"));
        assert_eq!(compare_price(&a, &b), None);
    }

    #[test]
    fn price_similarity_is_relative_to_larger_price() {
        let a = record(ProductSnapshot {
            price: 15.0,
            ..named("a")
        });
        let b = record(ProductSnapshot {
            price: 20.0,
            ..named("b")
        });
        let score = compare_price(&a, &b).unwrap();
        assert!((score - 0.75).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn category_compares_exact_text() {
        let a = record(ProductSnapshot {
            category: Some("Electronics".to_string()),
            ..named("a")
        });
        let b = record(ProductSnapshot {
            category: Some("Home".to_string()),
            ..named("b")
        });
        assert_eq!(compare_category(&a, &b), Some(0.0));
        assert_eq!(compare_category(&a, &a), Some(1.0));
    }

    #[test]
    fn image_compares_primary_url_only() {
        let a = record(ProductSnapshot {
            image_urls: vec!["https://cdn/a.jpg".to_string(), "https://cdn/b.jpg".to_string()],
            ..named("a")
        });
        let b = record(ProductSnapshot {
            image_urls: vec!["https://cdn/b.jpg".to_string()],
            ..named("b")
        });
        assert_eq!(compare_image(&a, &b), Some(0.0));
    }

    #[test]
    fn attribute_compare_dispatches_to_comparator() {
        let a = record(ProductSnapshot {
            sku: Some("X".to_string()),
            ..named("a")
        });
        assert_eq!(Attribute::Sku.compare(&a, &a), Some(1.0));
        assert_eq!(Attribute::Category.compare(&a, &a), None);
    }
}
