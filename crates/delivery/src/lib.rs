//! Delivery domain module.
//!
//! Robot/drone deliveries, their status state machine ([`status::TRANSITIONS`])
//! and the [`DeliveryLifecycleManager`] that drives them. Persistence is
//! abstracted behind [`DeliveryStore`] and [`DeliveryHistoryStore`].

pub mod delivery;
pub mod manager;
pub mod status;
pub mod store;

pub use delivery::{
    CreateDelivery, Delivery, DeliveryHistoryEvent, DeliveryQuery, EnergyChange, Location,
    LocationChange, StatusChange, UpdateLocation, UpdateStatus,
};
pub use manager::DeliveryLifecycleManager;
pub use status::DeliveryStatus;
pub use store::{DeliveryHistoryStore, DeliveryStore};
