//! Detection run: fetch both catalogs, tag provenance, cluster, summarize.
//!
//! A run is read-only and all-or-nothing: any retrieval failure aborts it and
//! no partial groups are returned.

use std::future::Future;

use chrono::{DateTime, Utc};
use produp_core::{
    AppConfig, CatalogRecord, ClusterMode, ProductSnapshot, Source, UserId, DEFAULT_THRESHOLD,
};
use serde::Serialize;
use thiserror::Error;

use crate::cluster::{build_groups, ClusterOptions, DuplicateGroup};

/// Record retrieval for one user and one origin collection.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every product `user_id` owns in `origin`, in a stable order.
    fn fetch_catalog(
        &self,
        user_id: &UserId,
        origin: Source,
    ) -> impl Future<Output = Result<Vec<ProductSnapshot>, Self::Error>> + Send;
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to retrieve {origin} records: {source}")]
    Retrieval {
        origin: Source,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectOptions {
    pub threshold: f64,
    pub mode: ClusterMode,
    pub parallel: bool,
    /// Evaluation time for master freshness. `None` means the wall clock.
    pub now: Option<DateTime<Utc>>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mode: ClusterMode::SeedAttach,
            parallel: false,
            now: None,
        }
    }
}

impl DetectOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            threshold: config.detect_threshold,
            mode: config.cluster_mode,
            parallel: config.parallel_scoring,
            now: None,
        }
    }

    fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            threshold: self.threshold,
            mode: self.mode,
            parallel: self.parallel,
        }
    }
}

/// Outcome of one detection run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Number of candidates across both origins.
    pub total_products: usize,
    /// Number of groups found.
    pub duplicate_groups: usize,
    /// Records that merging every group would remove: `sum(count - 1)`.
    pub total_duplicates: usize,
    pub duplicates: Vec<DuplicateGroup>,
}

impl DetectionResult {
    /// Cluster an already-materialized candidate list.
    #[must_use]
    pub fn compute(
        candidates: &[CatalogRecord],
        options: &ClusterOptions,
        now: DateTime<Utc>,
    ) -> Self {
        let duplicates = build_groups(candidates, options, now);
        Self {
            total_products: candidates.len(),
            duplicate_groups: duplicates.len(),
            total_duplicates: duplicates.iter().map(DuplicateGroup::duplicates).sum(),
            duplicates,
        }
    }
}

/// Find duplicate products across a user's primary and imported catalogs.
///
/// # Errors
///
/// Returns [`DetectError::InvalidArgument`] when `user_id` is missing or
/// malformed or the threshold is outside `(0, 1]`. Nothing is fetched in
/// that case. Returns [`DetectError::Retrieval`] when either catalog cannot
/// be read.
#[tracing::instrument(
    name = "detect_duplicates",
    level = "info",
    skip_all,
    fields(user_id = user_id.unwrap_or_default(), threshold = options.threshold)
)]
pub async fn detect_duplicates<S>(
    source: &S,
    user_id: Option<&str>,
    options: &DetectOptions,
) -> Result<DetectionResult, DetectError>
where
    S: CatalogSource + Sync,
{
    let user_id =
        UserId::parse(user_id).map_err(|e| DetectError::InvalidArgument(e.to_string()))?;
    validate_threshold(options.threshold)?;

    let (primary, imported) = futures::try_join!(
        fetch_origin(source, &user_id, Source::PrimaryCatalog),
        fetch_origin(source, &user_id, Source::ImportedCatalog),
    )?;

    tracing::info!(
        primary = primary.len(),
        imported = imported.len(),
        "catalogs loaded for duplicate detection"
    );

    let candidates: Vec<CatalogRecord> = primary
        .into_iter()
        .map(|p| CatalogRecord::new(Source::PrimaryCatalog, p))
        .chain(
            imported
                .into_iter()
                .map(|p| CatalogRecord::new(Source::ImportedCatalog, p)),
        )
        .collect();

    let now = options.now.unwrap_or_else(Utc::now);
    let result = DetectionResult::compute(&candidates, &options.cluster_options(), now);

    tracing::info!(
        mode = %options.mode,
        total_products = result.total_products,
        duplicate_groups = result.duplicate_groups,
        total_duplicates = result.total_duplicates,
        "duplicate detection complete"
    );

    Ok(result)
}

async fn fetch_origin<S: CatalogSource>(
    source: &S,
    user_id: &UserId,
    origin: Source,
) -> Result<Vec<ProductSnapshot>, DetectError> {
    source.fetch_catalog(user_id, origin).await.map_err(|e| {
        tracing::warn!(user_id = %user_id, origin = %origin, error = %e, "catalog retrieval failed");
        DetectError::Retrieval {
            origin,
            source: Box::new(e),
        }
    })
}

fn validate_threshold(threshold: f64) -> Result<(), DetectError> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(DetectError::InvalidArgument(format!(
            "threshold {threshold} is outside (0, 1]"
        )))
    }
}
