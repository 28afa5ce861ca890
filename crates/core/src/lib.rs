//! `smartstore-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the store
//! components (no infrastructure concerns): identifiers, the error taxonomy,
//! the entity trait and the persistence error/paging types every store trait
//! speaks.

pub mod entity;
pub mod error;
pub mod id;
pub mod store;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{DeliveryId, HistoryEventId, ProductId, SaleId, StoreOperationId};
pub use store::{Page, PageRequest, StoreError, StoreResult};
