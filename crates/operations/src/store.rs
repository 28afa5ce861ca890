use std::sync::Arc;

use chrono::{DateTime, Utc};

use smartstore_core::{StoreOperationId, StoreResult};

use crate::operation::{CheckoutStatus, EnergyAverages, ShelfStatus, StoreOperation};

/// Store-operation sample persistence capability.
///
/// Shelf and checkout updates replace one entry of a sample atomically, so
/// concurrent updates to different shelves of the same sample both land.
pub trait StoreOperationStore: Send + Sync {
    fn create(&self, op: StoreOperation) -> StoreResult<()>;

    fn get(&self, id: StoreOperationId) -> StoreResult<Option<StoreOperation>>;

    /// Most recently recorded sample.
    fn latest(&self) -> StoreResult<Option<StoreOperation>>;

    /// Samples with `start <= recorded_at < end`, oldest first.
    fn list_by_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<StoreOperation>>;

    /// Replace the shelf with `status.shelf_id`. `NotFound` names "shelf"
    /// when the sample has no such shelf.
    fn update_shelf(
        &self,
        id: StoreOperationId,
        status: ShelfStatus,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<StoreOperation>;

    /// Replace the register with `status.register_id`. `NotFound` names
    /// "checkout" when the sample has no such register.
    fn update_checkout(
        &self,
        id: StoreOperationId,
        status: CheckoutStatus,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<StoreOperation>;

    /// Mean energy readings over `[start, end)`; zeros when empty.
    fn average_usage(&self, start: DateTime<Utc>, end: DateTime<Utc>)
    -> StoreResult<EnergyAverages>;
}

impl<S> StoreOperationStore for Arc<S>
where
    S: StoreOperationStore + ?Sized,
{
    fn create(&self, op: StoreOperation) -> StoreResult<()> {
        (**self).create(op)
    }

    fn get(&self, id: StoreOperationId) -> StoreResult<Option<StoreOperation>> {
        (**self).get(id)
    }

    fn latest(&self) -> StoreResult<Option<StoreOperation>> {
        (**self).latest()
    }

    fn list_by_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<StoreOperation>> {
        (**self).list_by_range(start, end)
    }

    fn update_shelf(
        &self,
        id: StoreOperationId,
        status: ShelfStatus,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<StoreOperation> {
        (**self).update_shelf(id, status, occurred_at)
    }

    fn update_checkout(
        &self,
        id: StoreOperationId,
        status: CheckoutStatus,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<StoreOperation> {
        (**self).update_checkout(id, status, occurred_at)
    }

    fn average_usage(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<EnergyAverages> {
        (**self).average_usage(start, end)
    }
}
