//! Catalog records as seen by duplicate detection.
//!
//! A [`ProductSnapshot`] is what a storage collaborator hands back for one
//! row. A [`CatalogRecord`] is that snapshot after the detection run has
//! tagged it with the [`Source`] it was read from. Records expose no mutable
//! access, so nothing downstream can change them mid-run.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::CoreError;

/// Upper bound on the byte length of a caller-supplied user id.
const MAX_USER_ID_LEN: usize = 128;

/// Origin collection a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The user's own product catalog (`products` table).
    PrimaryCatalog,
    /// Supplier imports awaiting publication (`imported_products` table).
    ImportedCatalog,
}

impl Source {
    /// Every origin, in the order the detector concatenates them.
    pub const ALL: [Source; 2] = [Source::PrimaryCatalog, Source::ImportedCatalog];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::PrimaryCatalog => "primary_catalog",
            Source::ImportedCatalog => "imported_catalog",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary_catalog" => Ok(Source::PrimaryCatalog),
            "imported_catalog" => Ok(Source::ImportedCatalog),
            other => Err(CoreError::UnknownSource(other.to_string())),
        }
    }
}

/// Comparable attributes of one product, before provenance is attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Row id, unique only within its origin collection.
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    /// Selling price; `0.0` means unset.
    pub price: f64,
    pub category: Option<String>,
    /// All image URLs in display order. The first one is the primary image.
    pub image_urls: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
    /// AI quality score; `0.0` means the product was never scored.
    pub ai_score: f64,
    pub stock_quantity: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductSnapshot {
    /// Returns the first image URL, if any.
    #[must_use]
    pub fn primary_image_url(&self) -> Option<&str> {
        self.image_urls
            .first()
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }

    /// Returns the sku when it is present and not blank.
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        non_blank(self.sku.as_deref())
    }

    /// Returns the category when it is present and not blank.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Globally unique reference to a record: `(source, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub source: Source,
    pub id: String,
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// A product snapshot tagged with the collection it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    source: Source,
    product: ProductSnapshot,
}

impl CatalogRecord {
    #[must_use]
    pub fn new(source: Source, product: ProductSnapshot) -> Self {
        Self { source, product }
    }

    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    #[must_use]
    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.product.id
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey {
            source: self.source,
            id: self.product.id.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordView<'a> {
    source: Source,
    #[serde(flatten)]
    product: &'a ProductSnapshot,
    primary_image_url: Option<&'a str>,
}

impl Serialize for CatalogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordView {
            source: self.source,
            product: &self.product,
            primary_image_url: self.product.primary_image_url(),
        }
        .serialize(serializer)
    }
}

/// A validated user id scoping one detection run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate a caller-supplied user id.
    ///
    /// The value is trimmed first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidUserId`] when the id is absent or blank,
    /// longer than 128 bytes, or contains whitespace or control characters.
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        let value = raw
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CoreError::InvalidUserId("user id is required".to_string()))?;

        if value.len() > MAX_USER_ID_LEN {
            return Err(CoreError::InvalidUserId(format!(
                "user id exceeds {MAX_USER_ID_LEN} bytes"
            )));
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CoreError::InvalidUserId(
                "user id contains whitespace or control characters".to_string(),
            ));
        }

        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
