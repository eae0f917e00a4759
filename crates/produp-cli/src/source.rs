//! Postgres-backed [`CatalogSource`] for the detector.

use produp_core::{ProductSnapshot, Source, UserId};
use produp_db::DbError;
use produp_engine::CatalogSource;
use sqlx::PgPool;

pub(crate) struct PgCatalog<'a> {
    pool: &'a PgPool,
}

impl<'a> PgCatalog<'a> {
    pub(crate) fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogSource for PgCatalog<'_> {
    type Error = DbError;

    async fn fetch_catalog(
        &self,
        user_id: &UserId,
        origin: Source,
    ) -> Result<Vec<ProductSnapshot>, DbError> {
        let owner = produp_db::parse_user_uuid(user_id.as_str())?;

        let snapshots: Vec<ProductSnapshot> = match origin {
            Source::PrimaryCatalog => produp_db::list_products_for_user(self.pool, owner)
                .await?
                .into_iter()
                .map(ProductSnapshot::from)
                .collect(),
            Source::ImportedCatalog => {
                produp_db::list_imported_products_for_user(self.pool, owner)
                    .await?
                    .into_iter()
                    .map(ProductSnapshot::from)
                    .collect()
            }
        };

        tracing::debug!(%origin, count = snapshots.len(), "catalog rows fetched");
        Ok(snapshots)
    }
}
