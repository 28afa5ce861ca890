//! In-memory adapters for every store trait.
//!
//! Intended for tests/dev and single-process deployments. Each adapter keeps
//! its records behind one `RwLock`; conditional writes (stock adjustment,
//! status compare-and-swap) run entirely under the write lock.

mod delivery;
mod operation;
mod product;
mod sale;
mod table;

pub use delivery::{InMemoryDeliveryHistoryStore, InMemoryDeliveryStore};
pub use operation::InMemoryStoreOperationStore;
pub use product::InMemoryProductStore;
pub use sale::InMemorySaleStore;
