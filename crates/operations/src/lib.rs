//! Store operations module: periodic samples of in-store conditions
//! (temperature, humidity, shelves, registers) and energy draw.

pub mod operation;
pub mod service;
pub mod store;

pub use operation::{
    CheckoutStatus, EnergyAverages, NewStoreOperation, ShelfStatus, StoreOperation,
};
pub use service::StoreOperationService;
pub use store::StoreOperationStore;
