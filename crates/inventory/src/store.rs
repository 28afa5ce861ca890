use std::sync::Arc;

use chrono::{DateTime, Utc};

use smartstore_core::{ProductId, StoreResult};

use crate::product::{Product, ProductUpdate};

/// Product persistence capability.
///
/// `adjust_stock` is the only stock write path: implementations must apply
/// the check (result ≥ 0) and the write atomically, returning
/// `StoreError::Insufficient` without touching the record when the check fails.
/// `update_details` is applied under the same lock so it never overwrites a
/// concurrent stock change.
pub trait ProductStore: Send + Sync {
    fn get(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Insert a new product (`StoreError::Duplicate` if the id exists).
    fn insert(&self, product: Product) -> StoreResult<()>;

    /// Apply a validated update to an existing product (`StoreError::NotFound` if missing).
    fn update_details(
        &self,
        id: ProductId,
        update: &ProductUpdate,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<Product>;

    fn list(&self) -> StoreResult<Vec<Product>>;

    fn list_by_category(&self, category: &str) -> StoreResult<Vec<Product>>;

    /// Atomically apply a signed stock change and return the updated product.
    fn adjust_stock(
        &self,
        id: ProductId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<Product>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        (**self).get(id)
    }

    fn insert(&self, product: Product) -> StoreResult<()> {
        (**self).insert(product)
    }

    fn update_details(
        &self,
        id: ProductId,
        update: &ProductUpdate,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<Product> {
        (**self).update_details(id, update, occurred_at)
    }

    fn list(&self) -> StoreResult<Vec<Product>> {
        (**self).list()
    }

    fn list_by_category(&self, category: &str) -> StoreResult<Vec<Product>> {
        (**self).list_by_category(category)
    }

    fn adjust_stock(
        &self,
        id: ProductId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<Product> {
        (**self).adjust_stock(id, delta, occurred_at)
    }
}
