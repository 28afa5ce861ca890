use chrono::{DateTime, Utc};

use smartstore_core::{DomainError, DomainResult, Entity, StoreOperationId};

use crate::operation::{CheckoutStatus, NewStoreOperation, ShelfStatus, StoreOperation};
use crate::store::StoreOperationStore;

#[derive(Debug)]
pub struct StoreOperationService<S> {
    store: S,
}

impl<S> StoreOperationService<S>
where
    S: StoreOperationStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[tracing::instrument(skip(self, cmd), fields(recorded_at = %cmd.recorded_at))]
    pub fn record(&self, cmd: NewStoreOperation) -> DomainResult<StoreOperation> {
        let op = StoreOperation::record(StoreOperationId::new(), cmd).inspect_err(|err| {
            tracing::warn!(code = err.code(), error = %err, "store operation rejected");
        })?;
        self.store.create(op.clone()).map_err(|err| {
            tracing::error!(error = %err, "store operation write failed");
            DomainError::from(err)
        })?;
        tracing::info!(operation_id = %op.id_typed(), "store operation recorded");
        Ok(op)
    }

    pub fn latest(&self) -> DomainResult<StoreOperation> {
        self.store
            .latest()?
            .ok_or_else(|| DomainError::not_found(StoreOperation::KIND, "latest"))
    }

    pub fn by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<StoreOperation>> {
        if end < start {
            return Err(DomainError::validation("end must not be before start"));
        }
        Ok(self.store.list_by_range(start, end)?)
    }

    #[tracing::instrument(skip(self, status), fields(shelf_id = %status.shelf_id))]
    pub fn update_shelf_status(
        &self,
        id: StoreOperationId,
        status: ShelfStatus,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<StoreOperation> {
        status.validate()?;
        require_id(id)?;
        let op = self.store.update_shelf(id, status, occurred_at)?;
        tracing::info!(operation_id = %id, "shelf status updated");
        Ok(op)
    }

    #[tracing::instrument(skip(self, status), fields(register_id = %status.register_id))]
    pub fn update_checkout_status(
        &self,
        id: StoreOperationId,
        status: CheckoutStatus,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<StoreOperation> {
        status.validate()?;
        require_id(id)?;
        let op = self.store.update_checkout(id, status, occurred_at)?;
        tracing::info!(operation_id = %id, "checkout status updated");
        Ok(op)
    }

}

fn require_id(id: StoreOperationId) -> DomainResult<()> {
    if id.is_nil() {
        return Err(DomainError::validation("store operation id is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Duration;
    use smartstore_core::{StoreError, StoreResult};

    use super::*;
    use crate::operation::EnergyAverages;
    use crate::operation::tests::sample;

    #[derive(Debug, Default)]
    struct FakeStore {
        ops: Mutex<Vec<StoreOperation>>,
    }

    impl StoreOperationStore for FakeStore {
        fn create(&self, op: StoreOperation) -> StoreResult<()> {
            self.ops.lock().unwrap().push(op);
            Ok(())
        }

        fn get(&self, id: StoreOperationId) -> StoreResult<Option<StoreOperation>> {
            Ok(self.ops.lock().unwrap().iter().find(|o| o.id_typed() == id).cloned())
        }

        fn latest(&self) -> StoreResult<Option<StoreOperation>> {
            Ok(self.ops.lock().unwrap().iter().max_by_key(|o| o.recorded_at()).cloned())
        }

        fn list_by_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> StoreResult<Vec<StoreOperation>> {
            Ok(self
                .ops
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.recorded_at() >= start && o.recorded_at() < end)
                .cloned()
                .collect())
        }

        fn update_shelf(
            &self,
            id: StoreOperationId,
            status: ShelfStatus,
            at: DateTime<Utc>,
        ) -> StoreResult<StoreOperation> {
            let mut ops = self.ops.lock().unwrap();
            let op = ops
                .iter_mut()
                .find(|o| o.id_typed() == id)
                .ok_or_else(|| StoreError::not_found("store operation", id))?;
            let shelf_id = status.shelf_id.clone();
            if !op.replace_shelf(status, at) {
                return Err(StoreError::not_found("shelf", shelf_id));
            }
            Ok(op.clone())
        }

        fn update_checkout(
            &self,
            id: StoreOperationId,
            status: CheckoutStatus,
            at: DateTime<Utc>,
        ) -> StoreResult<StoreOperation> {
            let mut ops = self.ops.lock().unwrap();
            let op = ops
                .iter_mut()
                .find(|o| o.id_typed() == id)
                .ok_or_else(|| StoreError::not_found("store operation", id))?;
            let register_id = status.register_id.clone();
            if !op.replace_checkout(status, at) {
                return Err(StoreError::not_found("checkout", register_id));
            }
            Ok(op.clone())
        }

        fn average_usage(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> StoreResult<EnergyAverages> {
            Ok(EnergyAverages::from_samples(&self.list_by_range(start, end)?))
        }
    }

    fn service() -> StoreOperationService<FakeStore> {
        StoreOperationService::new(FakeStore::default())
    }

    #[test]
    fn latest_is_not_found_when_empty() {
        let service = service();
        assert!(matches!(service.latest(), Err(DomainError::NotFound { .. })));

        let t0 = Utc::now();
        service.record(sample(t0, 1.0, 1.0, 1.0)).unwrap();
        let newest = service.record(sample(t0 + Duration::minutes(5), 1.0, 1.0, 1.0)).unwrap();
        assert_eq!(service.latest().unwrap(), newest);
    }

    #[test]
    fn time_range_rejects_reversed_bounds() {
        let service = service();
        let t0 = Utc::now();
        assert!(matches!(
            service.by_time_range(t0, t0 - Duration::seconds(1)),
            Err(DomainError::Validation(_))
        ));
        assert!(service.by_time_range(t0, t0).unwrap().is_empty());
    }

    #[test]
    fn shelf_update_replaces_the_matching_shelf() {
        let service = service();
        let at = Utc::now();
        let op = service.record(sample(at, 1.0, 1.0, 1.0)).unwrap();

        let mut shelf = op.shelves()[0].clone();
        shelf.stock_level = 0;
        let updated = service
            .update_shelf_status(op.id_typed(), shelf.clone(), at + Duration::minutes(1))
            .unwrap();
        assert_eq!(updated.shelves()[0].stock_level, 0);
        assert_eq!(service.latest().unwrap().shelves()[0].stock_level, 0);

        shelf.shelf_id = "missing".to_string();
        assert!(matches!(
            service.update_shelf_status(op.id_typed(), shelf.clone(), at),
            Err(DomainError::NotFound { entity: "shelf", .. })
        ));

        shelf.shelf_id = "A-1".to_string();
        shelf.temperature = -40.0;
        assert!(matches!(
            service.update_shelf_status(op.id_typed(), shelf, at),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn checkout_update_validates_queue_and_operation() {
        let service = service();
        let at = Utc::now();
        let op = service.record(sample(at, 1.0, 1.0, 1.0)).unwrap();

        let mut register = op.checkouts()[0].clone();
        register.is_operational = false;
        let updated = service
            .update_checkout_status(op.id_typed(), register.clone(), at)
            .unwrap();
        assert!(!updated.checkouts()[0].is_operational);

        assert!(matches!(
            service.update_checkout_status(StoreOperationId::new(), register.clone(), at),
            Err(DomainError::NotFound { .. })
        ));

        register.queue_length = -1;
        assert!(matches!(
            service.update_checkout_status(op.id_typed(), register, at),
            Err(DomainError::Validation(_))
        ));
    }
}
