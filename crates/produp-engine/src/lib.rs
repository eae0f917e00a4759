//! Duplicate detection and entity resolution over a user's product catalogs.
//!
//! Pairwise similarity is a weighted blend of per-attribute comparators
//! ([`comparators`], [`scorer`]). [`cluster`] turns pairwise scores into
//! duplicate groups, [`master`] picks the record each group should keep, and
//! [`detector`] drives a full run against a [`CatalogSource`].

pub mod cluster;
pub mod comparators;
pub mod detector;
pub mod distance;
pub mod master;
pub mod response;
pub mod scorer;

pub use cluster::{build_groups, ClusterOptions, DuplicateGroup, MergePlan};
pub use comparators::Attribute;
pub use detector::{
    detect_duplicates, CatalogSource, DetectError, DetectOptions, DetectionResult,
};
pub use distance::normalized_similarity;
pub use master::{completeness_score, select_master};
pub use response::DetectionResponse;
pub use scorer::{breakdown, similarity, AttributeMatch};
