//! Completeness scoring used to pick the record a duplicate group keeps.

use chrono::{DateTime, Duration, Utc};
use produp_core::CatalogRecord;

// ---------------------------------------------------------------------------
// Point constants
// ---------------------------------------------------------------------------

/// Description longer than [`LONG_DESCRIPTION_CHARS`].
pub const P_DESCRIPTION: u32 = 20;
/// At least one image.
pub const P_IMAGE: u32 = 15;
pub const P_SKU: u32 = 10;
pub const P_CATEGORY: u32 = 10;
/// At least one tag.
pub const P_TAGS: u32 = 10;
/// AI score above zero.
pub const P_AI_SCORE: u32 = 15;
/// Stock above zero.
pub const P_STOCK: u32 = 10;
/// Created within [`FRESHNESS_WINDOW_DAYS`] of evaluation time.
pub const P_FRESH: u32 = 10;

pub const LONG_DESCRIPTION_CHARS: usize = 100;
pub const FRESHNESS_WINDOW_DAYS: i64 = 30;

/// Score how complete and fresh `record` is as of `now`. Higher is better.
#[must_use]
pub fn completeness_score(record: &CatalogRecord, now: DateTime<Utc>) -> u32 {
    let product = record.product();
    let window_start = now - Duration::days(FRESHNESS_WINDOW_DAYS);

    let checks = [
        (
            product.description.chars().count() > LONG_DESCRIPTION_CHARS,
            P_DESCRIPTION,
        ),
        (
            product.image_urls.iter().any(|url| !url.trim().is_empty()),
            P_IMAGE,
        ),
        (product.sku().is_some(), P_SKU),
        (product.category().is_some(), P_CATEGORY),
        (!product.tags.is_empty(), P_TAGS),
        (product.ai_score > 0.0, P_AI_SCORE),
        (product.stock_quantity > 0, P_STOCK),
        (
            product.created_at.is_some_and(|at| at >= window_start),
            P_FRESH,
        ),
    ];

    checks
        .iter()
        .filter(|(passed, _)| *passed)
        .map(|(_, points)| points)
        .sum()
}

/// Pick the member to keep: highest [`completeness_score`], earliest member
/// on ties. Returns `None` only for an empty slice.
#[must_use]
pub fn select_master(members: &[CatalogRecord], now: DateTime<Utc>) -> Option<&CatalogRecord> {
    select_master_index(members, now).map(|idx| &members[idx])
}

/// Position of the member [`select_master`] would pick.
#[must_use]
pub fn select_master_index(members: &[CatalogRecord], now: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, member) in members.iter().enumerate() {
        let score = completeness_score(member, now);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use produp_core::{ProductSnapshot, Source};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, snapshot: ProductSnapshot) -> CatalogRecord {
        CatalogRecord::new(
            Source::PrimaryCatalog,
            ProductSnapshot {
                id: id.to_string(),
                ..snapshot
            },
        )
    }

    #[test]
    fn empty_record_scores_zero() {
        let r = record("1", ProductSnapshot::default());
        assert_eq!(completeness_score(&r, now()), 0);
    }

    #[test]
    fn fully_populated_record_scores_every_point() {
        let r = record(
            "1",
            ProductSnapshot {
                description: "x".repeat(101),
                image_urls: vec!["https://cdn/a.jpg".to_string()],
                sku: Some("SKU".to_string()),
                category: Some("Home".to_string()),
                tags: vec!["lamp".to_string()],
                ai_score: 0.7,
                stock_quantity: 3,
                created_at: Some(now() - Duration::days(2)),
                ..ProductSnapshot::default()
            },
        );
        assert_eq!(completeness_score(&r, now()), 100);
    }

    #[test]
    fn description_of_exactly_one_hundred_chars_earns_nothing() {
        let r = record(
            "1",
            ProductSnapshot {
                description: "x".repeat(100),
                ..ProductSnapshot::default()
            },
        );
        assert_eq!(completeness_score(&r, now()), 0);
    }

    #[test]
    fn image_points_count_any_non_blank_url() {
        let r = record(
            "1",
            ProductSnapshot {
                image_urls: vec![String::new(), "https://cdn/b.jpg".to_string()],
                ..ProductSnapshot::default()
            },
        );
        assert_eq!(completeness_score(&r, now()), P_IMAGE);

        let blank = record(
            "2",
            ProductSnapshot {
                image_urls: vec![" ".to_string()],
                ..ProductSnapshot::default()
            },
        );
        assert_eq!(completeness_score(&blank, now()), 0);
    }

    #[test]
    fn stale_record_misses_freshness_points() {
        let r = record(
            "1",
            ProductSnapshot {
                created_at: Some(now() - Duration::days(31)),
                ..ProductSnapshot::default()
            },
        );
        assert_eq!(completeness_score(&r, now()), 0);
    }

    #[test]
    fn select_master_prefers_higher_score() {
        let sparse = record("sparse", ProductSnapshot::default());
        let rich = record(
            "rich",
            ProductSnapshot {
                sku: Some("SKU".to_string()),
                stock_quantity: 4,
                ..ProductSnapshot::default()
            },
        );
        let members = vec![sparse, rich];
        let master = select_master(&members, now()).unwrap();
        assert_eq!(master.id(), "rich");
    }

    #[test]
    fn select_master_keeps_first_on_tie() {
        let first = record(
            "first",
            ProductSnapshot {
                tags: vec!["a".to_string()],
                ..ProductSnapshot::default()
            },
        );
        let second = record(
            "second",
            ProductSnapshot {
                stock_quantity: 1,
                ..ProductSnapshot::default()
            },
        );
        let members = vec![first, second];
        let master = select_master(&members, now()).unwrap();
        assert_eq!(master.id(), "first");
    }

    #[test]
    fn select_master_of_empty_slice_is_none() {
        assert!(select_master(&[], now()).is_none());
    }
}
