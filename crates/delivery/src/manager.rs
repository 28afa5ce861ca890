use chrono::{DateTime, Utc};

use smartstore_core::{DeliveryId, DomainError, DomainResult, Entity, Page, PageRequest};

use crate::delivery::{
    CreateDelivery, Delivery, DeliveryHistoryEvent, DeliveryQuery, EnergyChange, LocationChange,
    StatusChange, UpdateLocation, UpdateStatus, validate_battery,
};
use crate::status::DeliveryStatus;
use crate::store::{DeliveryHistoryStore, DeliveryStore};

/// Owns the delivery state machine and location tracking.
///
/// Every write is guarded by the status read at the start of the operation,
/// so a concurrent writer surfaces as [`DomainError::Conflict`] instead of an
/// unchecked transition.
#[derive(Debug)]
pub struct DeliveryLifecycleManager<D, H> {
    deliveries: D,
    history: H,
    default_page_size: u32,
}

impl<D, H> DeliveryLifecycleManager<D, H>
where
    D: DeliveryStore,
    H: DeliveryHistoryStore,
{
    pub fn new(deliveries: D, history: H) -> Self {
        Self {
            deliveries,
            history,
            default_page_size: PageRequest::DEFAULT_LIMIT,
        }
    }

    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    #[tracing::instrument(skip(self, cmd), fields(carrier_id = %cmd.carrier_id))]
    pub fn create_delivery(&self, cmd: CreateDelivery) -> DomainResult<Delivery> {
        let occurred_at = cmd.occurred_at;
        let delivery = Delivery::dispatch(DeliveryId::new(), cmd).inspect_err(|err| {
            tracing::warn!(code = err.code(), error = %err, "delivery rejected");
        })?;

        self.deliveries
            .create(delivery.clone())
            .map_err(|err| persistence_failed(err.into()))?;
        tracing::info!(delivery_id = %delivery.id_typed(), "delivery created");

        self.record(&delivery, "created", occurred_at)?;
        Ok(delivery)
    }

    #[tracing::instrument(skip(self, cmd), fields(delivery_id = %cmd.delivery_id, status = %cmd.status))]
    pub fn update_status(&self, cmd: UpdateStatus) -> DomainResult<Delivery> {
        let current = self.load(cmd.delivery_id)?;
        let from = current.status();

        if !from.can_transition_to(cmd.status) {
            let err = DomainError::invalid_transition(from, cmd.status);
            tracing::warn!(code = err.code(), error = %err, "status update rejected");
            return Err(err);
        }

        let change = StatusChange {
            expected: from,
            status: cmd.status,
            completed_at: (cmd.status == DeliveryStatus::Completed).then_some(cmd.occurred_at),
            occurred_at: cmd.occurred_at,
        };
        let updated = self
            .deliveries
            .update_status(cmd.delivery_id, &change)
            .map_err(|err| write_failed(err.into()))?;
        tracing::info!(%from, to = %updated.status(), "delivery status changed");

        self.record(&updated, format!("status {from} -> {}", cmd.status), cmd.occurred_at)?;
        Ok(updated)
    }

    /// Record the carrier's position; the first report moves a preparing delivery in progress.
    #[tracing::instrument(skip(self, cmd), fields(delivery_id = %cmd.delivery_id))]
    pub fn update_location(&self, cmd: UpdateLocation) -> DomainResult<Delivery> {
        cmd.location.validate().inspect_err(|err| {
            tracing::warn!(code = err.code(), error = %err, "location update rejected");
        })?;
        if let Some(level) = cmd.battery_level {
            validate_battery(level)?;
        }

        let current = self.load(cmd.delivery_id)?;
        let from = current.status();
        if from.is_terminal() {
            let err = DomainError::invalid_state(format!("cannot move a {from} delivery"));
            tracing::warn!(code = err.code(), error = %err, "location update rejected");
            return Err(err);
        }

        let previous = current
            .current_location()
            .unwrap_or_else(|| current.start_location());
        let change = LocationChange {
            expected: from,
            status: DeliveryStatus::InProgress,
            location: cmd.location,
            distance_km: previous.distance_km(&cmd.location),
            battery_level: cmd.battery_level,
            occurred_at: cmd.occurred_at,
        };
        let updated = self
            .deliveries
            .update_location(cmd.delivery_id, &change)
            .map_err(|err| write_failed(err.into()))?;

        let note = if from == DeliveryStatus::Preparing {
            tracing::info!(%from, to = %updated.status(), "delivery departed");
            "departed"
        } else {
            "location updated"
        };
        tracing::debug!(
            latitude = cmd.location.latitude,
            longitude = cmd.location.longitude,
            distance_covered = updated.distance_covered(),
            "location recorded"
        );

        self.record(&updated, note, cmd.occurred_at)?;
        Ok(updated)
    }

    /// Accumulate energy drawn by the carrier (kWh).
    #[tracing::instrument(skip(self), fields(delivery_id = %id))]
    pub fn record_energy_usage(
        &self,
        id: DeliveryId,
        kwh: f64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Delivery> {
        if !kwh.is_finite() || kwh < 0.0 {
            return Err(DomainError::validation("energy usage must be a non-negative number"));
        }

        let current = self.load(id)?;
        if current.status().is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "cannot record energy on a {} delivery",
                current.status()
            )));
        }

        let change = EnergyChange {
            expected: current.status(),
            kwh,
            occurred_at,
        };
        self.deliveries
            .add_energy_usage(id, &change)
            .map_err(|err| write_failed(err.into()))
    }

    pub fn get_delivery(&self, id: DeliveryId) -> DomainResult<Delivery> {
        self.load(id)
    }

    pub fn active_deliveries(&self) -> DomainResult<Vec<Delivery>> {
        Ok(self.deliveries.list_active()?)
    }

    pub fn deliveries_by_carrier(&self, carrier_id: &str) -> DomainResult<Vec<Delivery>> {
        let carrier_id = carrier_id.trim();
        if carrier_id.is_empty() {
            return Err(DomainError::validation("carrier id is required"));
        }
        Ok(self.deliveries.list_by_carrier(carrier_id)?)
    }

    /// Newest first. Zero page/limit fall back to page 1 and the default page size.
    pub fn list_deliveries(&self, mut query: DeliveryQuery) -> DomainResult<Page<Delivery>> {
        query.page = query.page.normalized(self.default_page_size);
        Ok(self.deliveries.query(&query)?)
    }

    /// History events ordered by time; ties keep append order.
    pub fn delivery_history(&self, id: DeliveryId) -> DomainResult<Vec<DeliveryHistoryEvent>> {
        self.load(id)?;
        let mut events = self.history.list_for(id)?;
        events.sort_by_key(|e| e.occurred_at);
        Ok(events)
    }

    fn load(&self, id: DeliveryId) -> DomainResult<Delivery> {
        if id.is_nil() {
            return Err(DomainError::validation("delivery id is required"));
        }
        self.deliveries
            .get(id)?
            .ok_or_else(|| DomainError::not_found(Delivery::KIND, id))
    }

    /// Append to history after a successful write. The write is not undone on failure.
    fn record(
        &self,
        delivery: &Delivery,
        note: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let event = DeliveryHistoryEvent::new(delivery, note, occurred_at);
        let note = event.note.clone().unwrap_or_default();
        self.history.append(event).map_err(|err| {
            tracing::error!(delivery_id = %delivery.id_typed(), error = %err, "history append failed");
            DomainError::PartialFailure {
                cause: err.to_string(),
                applied: vec![format!("delivery {} {note}", delivery.id_typed())],
            }
        })
    }
}

fn write_failed(err: DomainError) -> DomainError {
    match &err {
        DomainError::Conflict(_) | DomainError::NotFound { .. } => {
            tracing::warn!(code = err.code(), error = %err, "delivery write lost a race");
        }
        _ => tracing::error!(error = %err, "delivery write failed"),
    }
    err
}

fn persistence_failed(err: DomainError) -> DomainError {
    tracing::error!(error = %err, "delivery write failed");
    err
}
