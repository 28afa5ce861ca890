//! Infrastructure layer: persistence adapters, config, service wiring.

pub mod config;
pub mod in_memory;
pub mod services;


pub use config::{ConfigError, StoreConfig};
pub use services::{StoreServices, build_services, init_tracing};
