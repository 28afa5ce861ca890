use core::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use smartstore_core::{DomainError, DomainResult, Entity, ProductId, SaleId};

/// Store-local part of the day a sale happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    EarlyMorning,
    Morning,
    Lunch,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 6] = [
        TimeOfDay::EarlyMorning,
        TimeOfDay::Morning,
        TimeOfDay::Lunch,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Bucket for a local hour (0..=23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::EarlyMorning,
            6..=10 => TimeOfDay::Morning,
            11..=13 => TimeOfDay::Lunch,
            14..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::EarlyMorning => "early_morning",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Lunch => "lunch",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TimeOfDay::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown time of day '{s}'")))
    }
}

/// One line of a recorded sale; the price is a snapshot taken at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g. yen).
    pub price_at_sale: u64,
}

/// Requested line: what the customer takes and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Command: CreateSale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSale {
    pub items: Vec<SaleLine>,
    pub payment_method: String,
    pub occurred_at: DateTime<Utc>,
}

impl CreateSale {
    pub fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("sale must contain at least one item"));
        }
        for line in &self.items {
            if line.product_id.is_nil() {
                return Err(DomainError::validation("product id is required"));
            }
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
        }
        if self.payment_method.trim().is_empty() {
            return Err(DomainError::validation("payment method is required"));
        }
        Ok(())
    }
}

/// A completed sale. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    id: SaleId,
    items: Vec<SaleItem>,
    total_amount: u64,
    /// kg CO2.
    total_co2_saved: f64,
    payment_method: String,
    time_of_day: TimeOfDay,
    weekday: Weekday,
    created_at: DateTime<Utc>,
}

impl Sale {
    /// Build a sale, deriving its totals and time buckets.
    pub fn record(
        id: SaleId,
        items: Vec<SaleItem>,
        total_co2_saved: f64,
        payment_method: impl Into<String>,
        created_at: DateTime<Utc>,
        offset: FixedOffset,
    ) -> DomainResult<Self> {
        let total_amount = total_amount(&items)?;
        Ok(Self {
            id,
            items,
            total_amount,
            total_co2_saved,
            payment_method: payment_method.into(),
            time_of_day: time_of_day(created_at, offset),
            weekday: weekday(created_at, offset),
            created_at,
        })
    }

    pub fn id_typed(&self) -> SaleId {
        self.id
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn total_co2_saved(&self) -> f64 {
        self.total_co2_saved
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Sale {
    type Id = SaleId;

    const KIND: &'static str = "sale";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Bucket of the store-local hour of `at`.
pub fn time_of_day(at: DateTime<Utc>, offset: FixedOffset) -> TimeOfDay {
    TimeOfDay::from_hour(at.with_timezone(&offset).hour())
}

/// Store-local weekday of `at`.
pub fn weekday(at: DateTime<Utc>, offset: FixedOffset) -> Weekday {
    at.with_timezone(&offset).weekday()
}

/// Σ quantity × price_at_sale, failing on overflow or a non-positive quantity.
pub fn total_amount(items: &[SaleItem]) -> DomainResult<u64> {
    items.iter().try_fold(0u64, |acc, item| {
        let quantity = u64::try_from(item.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| DomainError::validation("quantity must be positive"))?;
        quantity
            .checked_mul(item.price_at_sale)
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| DomainError::validation("sale total overflows"))
    })
}

/// Σ quantity × per-unit CO2, over `(quantity, co2_per_unit)` pairs.
pub fn co2_saved<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (i64, f64)>,
{
    lines
        .into_iter()
        .map(|(quantity, per_unit)| quantity as f64 * per_unit)
        .sum()
}
