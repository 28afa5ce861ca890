use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use smartstore_core::{DomainError, DomainResult, Entity, StoreOperationId};

/// Plausible temperatures from freezer shelves up to the sales floor (°C).
pub const TEMPERATURE_RANGE: core::ops::RangeInclusive<f64> = -30.0..=50.0;

pub const HUMIDITY_RANGE: core::ops::RangeInclusive<f64> = 0.0..=100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfStatus {
    pub shelf_id: String,
    pub stock_level: i64,
    pub temperature: f64,
    pub last_checked: DateTime<Utc>,
}

impl ShelfStatus {
    pub fn validate(&self) -> DomainResult<()> {
        if self.shelf_id.trim().is_empty() {
            return Err(DomainError::validation("shelf id is required"));
        }
        if self.stock_level < 0 {
            return Err(DomainError::validation("stock level must be non-negative"));
        }
        validate_temperature(self.temperature)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStatus {
    pub register_id: String,
    pub is_operational: bool,
    pub queue_length: i64,
    pub last_checked: DateTime<Utc>,
}

impl CheckoutStatus {
    pub fn validate(&self) -> DomainResult<()> {
        if self.register_id.trim().is_empty() {
            return Err(DomainError::validation("register id is required"));
        }
        if self.queue_length < 0 {
            return Err(DomainError::validation("queue length must be non-negative"));
        }
        Ok(())
    }
}

/// Command: record one sensor sample of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStoreOperation {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub crowd_density: f64,
    pub shelves: Vec<ShelfStatus>,
    pub checkouts: Vec<CheckoutStatus>,
    #[serde(default)]
    pub lighting_usage: f64,
    #[serde(default)]
    pub ac_usage: f64,
    #[serde(default)]
    pub refrig_usage: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A point-in-time sample of in-store conditions and energy draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOperation {
    id: StoreOperationId,
    temperature: f64,
    humidity: f64,
    crowd_density: f64,
    shelves: Vec<ShelfStatus>,
    checkouts: Vec<CheckoutStatus>,
    /// kWh.
    lighting_usage: f64,
    ac_usage: f64,
    refrig_usage: f64,
    recorded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoreOperation {
    pub fn record(id: StoreOperationId, cmd: NewStoreOperation) -> DomainResult<Self> {
        if cmd.shelves.is_empty() {
            return Err(DomainError::validation("at least one shelf status is required"));
        }
        if cmd.checkouts.is_empty() {
            return Err(DomainError::validation("at least one checkout status is required"));
        }
        validate_temperature(cmd.temperature)?;
        if !HUMIDITY_RANGE.contains(&cmd.humidity) {
            return Err(DomainError::validation(format!(
                "humidity {} must be within 0..=100",
                cmd.humidity
            )));
        }
        for (name, value) in [
            ("crowd density", cmd.crowd_density),
            ("lighting usage", cmd.lighting_usage),
            ("ac usage", cmd.ac_usage),
            ("refrigeration usage", cmd.refrig_usage),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::validation(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        cmd.shelves.iter().try_for_each(ShelfStatus::validate)?;
        cmd.checkouts.iter().try_for_each(CheckoutStatus::validate)?;

        Ok(Self {
            id,
            temperature: cmd.temperature,
            humidity: cmd.humidity,
            crowd_density: cmd.crowd_density,
            shelves: cmd.shelves,
            checkouts: cmd.checkouts,
            lighting_usage: cmd.lighting_usage,
            ac_usage: cmd.ac_usage,
            refrig_usage: cmd.refrig_usage,
            recorded_at: cmd.recorded_at,
            updated_at: cmd.recorded_at,
        })
    }

    pub fn id_typed(&self) -> StoreOperationId {
        self.id
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn crowd_density(&self) -> f64 {
        self.crowd_density
    }

    pub fn shelves(&self) -> &[ShelfStatus] {
        &self.shelves
    }

    pub fn checkouts(&self) -> &[CheckoutStatus] {
        &self.checkouts
    }

    pub fn lighting_usage(&self) -> f64 {
        self.lighting_usage
    }

    pub fn ac_usage(&self) -> f64 {
        self.ac_usage
    }

    pub fn refrig_usage(&self) -> f64 {
        self.refrig_usage
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the shelf with the same id. Returns `false` if there is none.
    pub fn replace_shelf(&mut self, status: ShelfStatus, at: DateTime<Utc>) -> bool {
        match self.shelves.iter_mut().find(|s| s.shelf_id == status.shelf_id) {
            Some(slot) => {
                *slot = status;
                self.updated_at = at;
                true
            }
            None => false,
        }
    }

    /// Replace the register with the same id. Returns `false` if there is none.
    pub fn replace_checkout(&mut self, status: CheckoutStatus, at: DateTime<Utc>) -> bool {
        match self
            .checkouts
            .iter_mut()
            .find(|c| c.register_id == status.register_id)
        {
            Some(slot) => {
                *slot = status;
                self.updated_at = at;
                true
            }
            None => false,
        }
    }
}

impl Entity for StoreOperation {
    type Id = StoreOperationId;

    const KIND: &'static str = "store operation";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Per-system mean energy readings over a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyAverages {
    pub lighting: f64,
    pub ac: f64,
    pub refrig: f64,
    pub samples: usize,
}

impl EnergyAverages {
    /// All zeros when there are no samples.
    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a StoreOperation>,
    {
        let (mut lighting, mut ac, mut refrig, mut n) = (0.0, 0.0, 0.0, 0usize);
        for op in samples {
            lighting += op.lighting_usage;
            ac += op.ac_usage;
            refrig += op.refrig_usage;
            n += 1;
        }
        if n == 0 {
            return Self::default();
        }
        let n_f = n as f64;
        Self {
            lighting: lighting / n_f,
            ac: ac / n_f,
            refrig: refrig / n_f,
            samples: n,
        }
    }

    pub fn total(&self) -> f64 {
        self.lighting + self.ac + self.refrig
    }
}

fn validate_temperature(value: f64) -> DomainResult<()> {
    if !TEMPERATURE_RANGE.contains(&value) {
        return Err(DomainError::validation(format!(
            "temperature {value} must be within -30..=50"
        )));
    }
    Ok(())
}
