use std::sync::Arc;

use chrono::{DateTime, Utc};

use smartstore_core::{SaleId, StoreResult};

use crate::sale::{Sale, TimeOfDay};

/// Sale persistence capability. Sales are write-once.
pub trait SaleStore: Send + Sync {
    fn create(&self, sale: Sale) -> StoreResult<()>;

    fn get(&self, id: SaleId) -> StoreResult<Option<Sale>>;

    /// Sales with `start <= created_at < end`, oldest first.
    fn list_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<Sale>>;

    fn list_by_time_of_day(&self, bucket: TimeOfDay) -> StoreResult<Vec<Sale>>;
}

impl<S> SaleStore for Arc<S>
where
    S: SaleStore + ?Sized,
{
    fn create(&self, sale: Sale) -> StoreResult<()> {
        (**self).create(sale)
    }

    fn get(&self, id: SaleId) -> StoreResult<Option<Sale>> {
        (**self).get(id)
    }

    fn list_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<Sale>> {
        (**self).list_by_range(start, end)
    }

    fn list_by_time_of_day(&self, bucket: TimeOfDay) -> StoreResult<Vec<Sale>> {
        (**self).list_by_time_of_day(bucket)
    }
}
