use std::sync::RwLock;

use smartstore_core::{DeliveryId, Page, StoreError, StoreResult};
use smartstore_delivery::{
    Delivery, DeliveryHistoryEvent, DeliveryHistoryStore, DeliveryQuery, DeliveryStatus,
    DeliveryStore, EnergyChange, LocationChange, StatusChange,
};

use super::table::Table;

/// Deliveries with compare-and-swap status writes.
#[derive(Debug, Default)]
pub struct InMemoryDeliveryStore {
    deliveries: Table<Delivery>,
}

impl InMemoryDeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `write` only if the stored status is still `expected`.
    fn guarded<F>(&self, id: DeliveryId, expected: DeliveryStatus, write: F) -> StoreResult<Delivery>
    where
        F: FnOnce(&mut Delivery),
    {
        self.deliveries.update(&id, |delivery| {
            if delivery.status() != expected {
                return Err(StoreError::Conflict(format!(
                    "delivery {id} is {}, expected {expected}",
                    delivery.status()
                )));
            }
            write(delivery);
            Ok(delivery.clone())
        })
    }

    /// Newest first; ids break ties.
    fn newest_first(mut deliveries: Vec<Delivery>) -> Vec<Delivery> {
        deliveries.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id_typed().as_uuid().cmp(a.id_typed().as_uuid()))
        });
        deliveries
    }
}

impl DeliveryStore for InMemoryDeliveryStore {
    fn get(&self, id: DeliveryId) -> StoreResult<Option<Delivery>> {
        self.deliveries.get(&id)
    }

    fn create(&self, delivery: Delivery) -> StoreResult<()> {
        self.deliveries.insert(delivery)
    }

    fn update_status(&self, id: DeliveryId, change: &StatusChange) -> StoreResult<Delivery> {
        self.guarded(id, change.expected, |d| d.apply_status_change(change))
    }

    fn update_location(&self, id: DeliveryId, change: &LocationChange) -> StoreResult<Delivery> {
        self.guarded(id, change.expected, |d| d.apply_location_change(change))
    }

    fn add_energy_usage(&self, id: DeliveryId, change: &EnergyChange) -> StoreResult<Delivery> {
        self.guarded(id, change.expected, |d| d.apply_energy_change(change))
    }

    fn list_active(&self) -> StoreResult<Vec<Delivery>> {
        Ok(Self::newest_first(
            self.deliveries.filter(|d| d.status().is_active())?,
        ))
    }

    fn list_by_carrier(&self, carrier_id: &str) -> StoreResult<Vec<Delivery>> {
        Ok(Self::newest_first(
            self.deliveries.filter(|d| d.carrier_id() == carrier_id)?,
        ))
    }

    fn query(&self, query: &DeliveryQuery) -> StoreResult<Page<Delivery>> {
        let matches = Self::newest_first(self.deliveries.filter(|d| query.matches(d))?);
        Ok(Page::from_sorted(matches, query.page))
    }
}

/// Append-only delivery history.
#[derive(Debug, Default)]
pub struct InMemoryDeliveryHistoryStore {
    events: RwLock<Vec<DeliveryHistoryEvent>>,
}

impl InMemoryDeliveryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeliveryHistoryStore for InMemoryDeliveryHistoryStore {
    fn append(&self, event: DeliveryHistoryEvent) -> StoreResult<()> {
        self.events
            .write()
            .map_err(|_| StoreError::backend("delivery history lock poisoned"))?
            .push(event);
        Ok(())
    }

    fn list_for(&self, delivery_id: DeliveryId) -> StoreResult<Vec<DeliveryHistoryEvent>> {
        let events = self
            .events
            .read()
            .map_err(|_| StoreError::backend("delivery history lock poisoned"))?;
        Ok(events
            .iter()
            .filter(|e| e.delivery_id == delivery_id)
            .cloned()
            .collect())
    }
}
