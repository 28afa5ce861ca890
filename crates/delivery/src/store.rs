use std::sync::Arc;

use smartstore_core::{DeliveryId, Page, StoreResult};

use crate::delivery::{
    Delivery, DeliveryHistoryEvent, DeliveryQuery, EnergyChange, LocationChange, StatusChange,
};

/// Delivery persistence capability.
///
/// The `update_*` writes are compare-and-swap on status: implementations
/// apply the change only if the stored status equals `change.expected` and
/// return `StoreError::Conflict` otherwise, leaving the record untouched.
pub trait DeliveryStore: Send + Sync {
    fn get(&self, id: DeliveryId) -> StoreResult<Option<Delivery>>;

    fn create(&self, delivery: Delivery) -> StoreResult<()>;

    fn update_status(&self, id: DeliveryId, change: &StatusChange) -> StoreResult<Delivery>;

    fn update_location(&self, id: DeliveryId, change: &LocationChange) -> StoreResult<Delivery>;

    fn add_energy_usage(&self, id: DeliveryId, change: &EnergyChange) -> StoreResult<Delivery>;

    /// Deliveries in `Preparing` or `InProgress`.
    fn list_active(&self) -> StoreResult<Vec<Delivery>>;

    fn list_by_carrier(&self, carrier_id: &str) -> StoreResult<Vec<Delivery>>;

    /// Filtered page, newest first. `query.page` is already normalized.
    fn query(&self, query: &DeliveryQuery) -> StoreResult<Page<Delivery>>;
}

/// Append-only delivery history.
pub trait DeliveryHistoryStore: Send + Sync {
    fn append(&self, event: DeliveryHistoryEvent) -> StoreResult<()>;

    /// Events for one delivery in append order.
    fn list_for(&self, delivery_id: DeliveryId) -> StoreResult<Vec<DeliveryHistoryEvent>>;
}

impl<S> DeliveryStore for Arc<S>
where
    S: DeliveryStore + ?Sized,
{
    fn get(&self, id: DeliveryId) -> StoreResult<Option<Delivery>> {
        (**self).get(id)
    }

    fn create(&self, delivery: Delivery) -> StoreResult<()> {
        (**self).create(delivery)
    }

    fn update_status(&self, id: DeliveryId, change: &StatusChange) -> StoreResult<Delivery> {
        (**self).update_status(id, change)
    }

    fn update_location(&self, id: DeliveryId, change: &LocationChange) -> StoreResult<Delivery> {
        (**self).update_location(id, change)
    }

    fn add_energy_usage(&self, id: DeliveryId, change: &EnergyChange) -> StoreResult<Delivery> {
        (**self).add_energy_usage(id, change)
    }

    fn list_active(&self) -> StoreResult<Vec<Delivery>> {
        (**self).list_active()
    }

    fn list_by_carrier(&self, carrier_id: &str) -> StoreResult<Vec<Delivery>> {
        (**self).list_by_carrier(carrier_id)
    }

    fn query(&self, query: &DeliveryQuery) -> StoreResult<Page<Delivery>> {
        (**self).query(query)
    }
}

impl<S> DeliveryHistoryStore for Arc<S>
where
    S: DeliveryHistoryStore + ?Sized,
{
    fn append(&self, event: DeliveryHistoryEvent) -> StoreResult<()> {
        (**self).append(event)
    }

    fn list_for(&self, delivery_id: DeliveryId) -> StoreResult<Vec<DeliveryHistoryEvent>> {
        (**self).list_for(delivery_id)
    }
}
