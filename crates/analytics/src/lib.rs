//! Read-side aggregates over sales, products and store-operation samples.
//!
//! Nothing here is persisted; every report is recomputed from the stores
//! for the requested window.

pub mod aggregator;
pub mod report;

pub use aggregator::AnalyticsAggregator;
pub use report::{CategorySales, EnergyUsageAnalytics, EnvironmentalImpact, SalesAnalytics};
