//! Inventory domain module.
//!
//! Products and their stock counts, plus the [`InventoryLedger`] that is the
//! only component allowed to move stock. Persistence is abstracted behind
//! [`ProductStore`].

pub mod ledger;
pub mod product;
pub mod store;

pub use ledger::InventoryLedger;
pub use product::{NewProduct, Product, ProductUpdate, StockShortfall};
pub use store::ProductStore;
