use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use smartstore_core::{DeliveryId, DomainError, DomainResult, Entity, HistoryEventId, PageRequest};

use crate::status::DeliveryStatus;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographical position.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The zero value stands for "no location supplied".
    pub fn is_absent(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Present, finite and within WGS84 bounds.
    pub fn validate(&self) -> DomainResult<()> {
        if self.is_absent() {
            return Err(DomainError::invalid_location("location is required"));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(DomainError::invalid_location(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(DomainError::invalid_location(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Great-circle (haversine) distance in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A robot/drone delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    id: DeliveryId,
    carrier_id: String,
    status: DeliveryStatus,
    start_location: Location,
    end_location: Location,
    current_location: Option<Location>,
    battery_level: Option<f64>,
    /// kWh consumed so far.
    energy_usage: f64,
    /// Kilometres travelled so far.
    distance_covered: f64,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Command: dispatch a new delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDelivery {
    pub carrier_id: String,
    pub start_location: Location,
    pub end_location: Location,
    #[serde(default)]
    pub battery_level: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: move a delivery to another status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub delivery_id: DeliveryId,
    pub status: DeliveryStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: report the carrier's current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocation {
    pub delivery_id: DeliveryId,
    pub location: Location,
    #[serde(default)]
    pub battery_level: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Guarded status write: applied only if the stored status is still `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub expected: DeliveryStatus,
    pub status: DeliveryStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub occurred_at: DateTime<Utc>,
}

/// Guarded location write: applied only if the stored status is still `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationChange {
    pub expected: DeliveryStatus,
    pub status: DeliveryStatus,
    pub location: Location,
    pub distance_km: f64,
    pub battery_level: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Guarded energy accumulation: applied only if the stored status is still `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyChange {
    pub expected: DeliveryStatus,
    pub kwh: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Filter + page for listing deliveries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuery {
    pub status: Option<DeliveryStatus>,
    pub carrier_id: Option<String>,
    #[serde(default)]
    pub page: PageRequest,
}

impl DeliveryQuery {
    pub fn matches(&self, delivery: &Delivery) -> bool {
        self.status.is_none_or(|s| s == delivery.status)
            && self
                .carrier_id
                .as_deref()
                .is_none_or(|c| c == delivery.carrier_id)
    }
}

impl Delivery {
    /// Validate a dispatch command and build the delivery in its initial state.
    pub fn dispatch(id: DeliveryId, cmd: CreateDelivery) -> DomainResult<Self> {
        let carrier_id = cmd.carrier_id.trim();
        if carrier_id.is_empty() {
            return Err(DomainError::validation("carrier id is required"));
        }
        if cmd.start_location.is_absent() {
            return Err(DomainError::validation("start location is required"));
        }
        if cmd.end_location.is_absent() {
            return Err(DomainError::validation("end location is required"));
        }
        cmd.start_location.validate()?;
        cmd.end_location.validate()?;
        if let Some(level) = cmd.battery_level {
            validate_battery(level)?;
        }

        Ok(Self {
            id,
            carrier_id: carrier_id.to_string(),
            status: DeliveryStatus::Preparing,
            start_location: cmd.start_location,
            end_location: cmd.end_location,
            current_location: Some(cmd.start_location),
            battery_level: cmd.battery_level,
            energy_usage: 0.0,
            distance_covered: 0.0,
            started_at: cmd.occurred_at,
            completed_at: None,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
        })
    }

    pub fn id_typed(&self) -> DeliveryId {
        self.id
    }

    pub fn carrier_id(&self) -> &str {
        &self.carrier_id
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn start_location(&self) -> Location {
        self.start_location
    }

    pub fn end_location(&self) -> Location {
        self.end_location
    }

    /// Only meaningful while the delivery is active.
    pub fn current_location(&self) -> Option<Location> {
        self.current_location
    }

    pub fn battery_level(&self) -> Option<f64> {
        self.battery_level
    }

    pub fn energy_usage(&self) -> f64 {
        self.energy_usage
    }

    pub fn distance_covered(&self) -> f64 {
        self.distance_covered
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Write a status change. Callers check `change.expected` against the stored status first.
    pub fn apply_status_change(&mut self, change: &StatusChange) {
        self.status = change.status;
        if change.completed_at.is_some() {
            self.completed_at = change.completed_at;
        }
        if change.status.is_terminal() {
            self.current_location = None;
        }
        self.updated_at = change.occurred_at;
    }

    /// Write a location change. Callers check `change.expected` against the stored status first.
    pub fn apply_location_change(&mut self, change: &LocationChange) {
        self.status = change.status;
        self.current_location = Some(change.location);
        self.distance_covered += change.distance_km;
        if change.battery_level.is_some() {
            self.battery_level = change.battery_level;
        }
        self.updated_at = change.occurred_at;
    }

    /// Accumulate energy usage. Callers check `change.expected` against the stored status first.
    pub fn apply_energy_change(&mut self, change: &EnergyChange) {
        self.energy_usage += change.kwh;
        self.updated_at = change.occurred_at;
    }
}

impl Entity for Delivery {
    type Id = DeliveryId;

    const KIND: &'static str = "delivery";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

pub(crate) fn validate_battery(level: f64) -> DomainResult<()> {
    if !level.is_finite() || !(0.0..=100.0).contains(&level) {
        return Err(DomainError::validation(format!(
            "battery level {level} must be within 0..=100"
        )));
    }
    Ok(())
}

/// One entry of a delivery's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryHistoryEvent {
    pub id: HistoryEventId,
    pub delivery_id: DeliveryId,
    pub status: DeliveryStatus,
    pub location: Option<Location>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl DeliveryHistoryEvent {
    pub fn new(
        delivery: &Delivery,
        note: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: HistoryEventId::new(),
            delivery_id: delivery.id,
            status: delivery.status,
            location: delivery.current_location,
            note: Some(note.into()),
            occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokyo() -> Location {
        Location::new(35.68, 139.69)
    }

    fn dispatch_cmd() -> CreateDelivery {
        CreateDelivery {
            carrier_id: "robot-7".to_string(),
            start_location: tokyo(),
            end_location: Location::new(35.66, 139.70),
            battery_level: Some(90.0),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn zero_location_is_absent() {
        assert!(Location::default().is_absent());
        assert!(!Location::new(0.0, 1.0).is_absent());
        assert!(Location::new(91.0, 0.0).validate().is_err());
        assert!(Location::new(10.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn distance_between_same_points_is_zero() {
        assert_eq!(tokyo().distance_km(&tokyo()), 0.0);
        // Tokyo -> Osaka is roughly 400 km.
        let osaka = Location::new(34.69, 135.50);
        let d = tokyo().distance_km(&osaka);
        assert!((390.0..410.0).contains(&d), "got {d}");
    }

    #[test]
    fn dispatch_starts_at_the_start_location() {
        let delivery = Delivery::dispatch(DeliveryId::new(), dispatch_cmd()).unwrap();
        assert_eq!(delivery.status(), DeliveryStatus::Preparing);
        assert_eq!(delivery.current_location(), Some(delivery.start_location()));
        assert_eq!(delivery.started_at(), delivery.created_at());
        assert!(delivery.completed_at().is_none());
    }

    #[test]
    fn dispatch_trims_and_requires_carrier() {
        let mut cmd = dispatch_cmd();
        cmd.carrier_id = "   ".to_string();
        let err = Delivery::dispatch(DeliveryId::new(), cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("carrier")));
    }

    #[test]
    fn terminal_status_change_clears_current_location() {
        let mut delivery = Delivery::dispatch(DeliveryId::new(), dispatch_cmd()).unwrap();
        let at = Utc::now();
        delivery.apply_status_change(&StatusChange {
            expected: DeliveryStatus::Preparing,
            status: DeliveryStatus::Failed,
            completed_at: None,
            occurred_at: at,
        });
        assert_eq!(delivery.status(), DeliveryStatus::Failed);
        assert!(delivery.current_location().is_none());
        assert!(delivery.completed_at().is_none());
        assert_eq!(delivery.updated_at(), at);
    }

    #[test]
    fn query_filters_by_status_and_carrier() {
        let delivery = Delivery::dispatch(DeliveryId::new(), dispatch_cmd()).unwrap();
        assert!(DeliveryQuery::default().matches(&delivery));
        let by_carrier = DeliveryQuery {
            carrier_id: Some("robot-7".to_string()),
            ..DeliveryQuery::default()
        };
        assert!(by_carrier.matches(&delivery));
        let by_status = DeliveryQuery {
            status: Some(DeliveryStatus::Completed),
            ..DeliveryQuery::default()
        };
        assert!(!by_status.matches(&delivery));
    }
}
