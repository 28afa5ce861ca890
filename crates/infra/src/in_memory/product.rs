use chrono::{DateTime, Utc};

use smartstore_core::{ProductId, StoreError, StoreResult};
use smartstore_inventory::{Product, ProductStore, ProductUpdate, StockShortfall};

use super::table::Table;

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: Table<Product>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductStore for InMemoryProductStore {
    fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.products.get(&id)
    }

    fn insert(&self, product: Product) -> StoreResult<()> {
        self.products.insert(product)
    }

    fn update_details(
        &self,
        id: ProductId,
        update: &ProductUpdate,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<Product> {
        self.products.update(&id, |product| {
            product.apply_update(update, occurred_at);
            Ok(product.clone())
        })
    }

    fn list(&self) -> StoreResult<Vec<Product>> {
        let mut products = self.products.filter(|_| true)?;
        products.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(products)
    }

    fn list_by_category(&self, category: &str) -> StoreResult<Vec<Product>> {
        let mut products = self.products.filter(|p| p.category() == category)?;
        products.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(products)
    }

    fn adjust_stock(
        &self,
        id: ProductId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> StoreResult<Product> {
        self.products.update(&id, |product| {
            product.apply_stock_delta(delta, occurred_at).map_err(
                |StockShortfall {
                     requested,
                     available,
                 }| StoreError::Insufficient {
                    id: id.to_string(),
                    requested,
                    available,
                },
            )?;
            Ok(product.clone())
        })
    }
}
