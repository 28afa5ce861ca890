//! Sales domain module.
//!
//! Records multi-item sales against inventory. [`SaleTransactionProcessor`]
//! decrements stock line by line and compensates already-applied decrements
//! when a later step fails. Derived fields (totals, time buckets) are plain
//! functions in [`sale`].

pub mod processor;
pub mod sale;
pub mod store;

pub use processor::SaleTransactionProcessor;
pub use sale::{
    CreateSale, Sale, SaleItem, SaleLine, TimeOfDay, co2_saved, time_of_day, total_amount, weekday,
};
pub use store::SaleStore;
