use std::collections::{BTreeMap, HashMap};

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use smartstore_sales::TimeOfDay;

/// Category name used for sale lines whose product no longer exists.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalImpact {
    /// kg CO2.
    pub total_co2_saved: f64,
    pub average_co2_saved_per_item: f64,
    /// Number of sale lines in the window.
    pub total_eco_friendly_items: usize,
}

/// Units sold per product category.
pub type CategorySales = BTreeMap<String, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyUsageAnalytics {
    pub average_lighting_usage: f64,
    pub average_ac_usage: f64,
    pub average_refrig_usage: f64,
    pub total_usage: f64,
    pub usage_per_hour: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAnalytics {
    pub total_sales: usize,
    pub total_amount: u64,
    pub time_of_day_sales: HashMap<TimeOfDay, usize>,
    pub weekday_sales: HashMap<Weekday, usize>,
    pub total_co2_saved: f64,
}
