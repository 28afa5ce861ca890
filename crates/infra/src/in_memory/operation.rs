use chrono::{DateTime, Utc};

use smartstore_core::{StoreError, StoreOperationId, StoreResult};
use smartstore_operations::{
    CheckoutStatus, EnergyAverages, ShelfStatus, StoreOperation, StoreOperationStore,
};

use super::table::Table;

#[derive(Debug, Default)]
pub struct InMemoryStoreOperationStore {
    operations: Table<StoreOperation>,
}

impl InMemoryStoreOperationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreOperationStore for InMemoryStoreOperationStore {
    fn create(&self, op: StoreOperation) -> StoreResult<()> {
        self.operations.insert(op)
    }

    fn get(&self, id: StoreOperationId) -> StoreResult<Option<StoreOperation>> {
        self.operations.get(&id)
    }

    fn latest(&self) -> StoreResult<Option<StoreOperation>> {
        Ok(self
            .operations
            .filter(|_| true)?
            .into_iter()
            .max_by_key(|op| (op.recorded_at(), *op.id_typed().as_uuid())))
    }

    fn list_by_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<StoreOperation>> {
        let mut ops = self
            .operations
            .filter(|op| op.recorded_at() >= start && op.recorded_at() < end)?;
        ops.sort_by_key(|op| op.recorded_at());
        Ok(ops)
    }

    fn update_shelf(
        &self,
        id: StoreOperationId,
        status: ShelfStatus,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<StoreOperation> {
        self.operations.update(&id, |op| {
            let shelf_id = status.shelf_id.clone();
            if !op.replace_shelf(status, occurred_at) {
                return Err(StoreError::not_found("shelf", shelf_id));
            }
            Ok(op.clone())
        })
    }

    fn update_checkout(
        &self,
        id: StoreOperationId,
        status: CheckoutStatus,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<StoreOperation> {
        self.operations.update(&id, |op| {
            let register_id = status.register_id.clone();
            if !op.replace_checkout(status, occurred_at) {
                return Err(StoreError::not_found("checkout", register_id));
            }
            Ok(op.clone())
        })
    }

    fn average_usage(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<EnergyAverages> {
        let ops = self.list_by_range(start, end)?;
        Ok(EnergyAverages::from_samples(&ops))
    }
}
