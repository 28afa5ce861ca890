//! Service wiring: in-memory adapters shared behind `Arc` by the store components.

use std::sync::Arc;

use smartstore_analytics::AnalyticsAggregator;
use smartstore_delivery::DeliveryLifecycleManager;
use smartstore_inventory::InventoryLedger;
use smartstore_operations::StoreOperationService;
use smartstore_sales::SaleTransactionProcessor;

use crate::config::{ConfigError, StoreConfig};
use crate::in_memory::{
    InMemoryDeliveryHistoryStore, InMemoryDeliveryStore, InMemoryProductStore,
    InMemorySaleStore, InMemoryStoreOperationStore,
};

pub type Products = Arc<InMemoryProductStore>;
pub type Deliveries = Arc<InMemoryDeliveryStore>;
pub type DeliveryHistory = Arc<InMemoryDeliveryHistoryStore>;
pub type Sales = Arc<InMemorySaleStore>;
pub type Operations = Arc<InMemoryStoreOperationStore>;

/// Every store component, wired to one shared set of stores.
#[derive(Debug)]
pub struct StoreServices {
    pub inventory: InventoryLedger<Products>,
    pub deliveries: DeliveryLifecycleManager<Deliveries, DeliveryHistory>,
    pub sales: SaleTransactionProcessor<Products, Sales>,
    pub operations: StoreOperationService<Operations>,
    pub analytics: AnalyticsAggregator<Products, Sales, Operations>,
}

pub fn build_services(config: &StoreConfig) -> Result<StoreServices, ConfigError> {
    config.validate()?;
    let offset = config.utc_offset()?;

    let products: Products = Arc::new(InMemoryProductStore::new());
    let deliveries: Deliveries = Arc::new(InMemoryDeliveryStore::new());
    let history: DeliveryHistory = Arc::new(InMemoryDeliveryHistoryStore::new());
    let sales: Sales = Arc::new(InMemorySaleStore::new());
    let operations: Operations = Arc::new(InMemoryStoreOperationStore::new());

    tracing::info!(
        utc_offset_minutes = config.utc_offset_minutes,
        delivery_page_size = config.delivery_page_size,
        "store services wired with in-memory stores"
    );

    Ok(StoreServices {
        inventory: InventoryLedger::new(products.clone()),
        deliveries: DeliveryLifecycleManager::new(deliveries, history)
            .with_default_page_size(config.delivery_page_size),
        sales: SaleTransactionProcessor::new(
            InventoryLedger::new(products.clone()),
            sales.clone(),
            offset,
        ),
        operations: StoreOperationService::new(operations.clone()),
        analytics: AnalyticsAggregator::new(products, sales, operations),
    })
}

/// Install the process-wide subscriber described by `config`.
pub fn init_tracing(config: &StoreConfig) {
    smartstore_observability::tracing::init_with(config.log_format, &config.log_filter);
}
