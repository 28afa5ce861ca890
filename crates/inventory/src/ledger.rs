use chrono::{DateTime, Utc};

use smartstore_core::{DomainError, DomainResult, Entity, ProductId, StoreError};

use crate::product::{NewProduct, Product, ProductUpdate};
use crate::store::ProductStore;

/// Owns per-product stock counts.
///
/// All stock writes go through the store's atomic `adjust_stock`, so the
/// non-negative check and the write cannot interleave with another sale.
#[derive(Debug)]
pub struct InventoryLedger<S> {
    store: S,
}

impl<S> InventoryLedger<S>
where
    S: ProductStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a product in the catalog.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub fn register(&self, cmd: NewProduct, occurred_at: DateTime<Utc>) -> DomainResult<Product> {
        let product = Product::register(ProductId::new(), cmd, occurred_at)?;
        self.store.insert(product.clone())?;
        tracing::info!(product_id = %product.id_typed(), stock = product.stock(), "product registered");
        Ok(product)
    }

    /// Change catalog details such as price or category. Past sales keep
    /// the price they were sold at.
    #[tracing::instrument(skip(self, update), fields(product_id = %id))]
    pub fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Product> {
        if id.is_nil() {
            return Err(DomainError::validation("product id is required"));
        }
        update.validate().inspect_err(|err| {
            tracing::warn!(code = err.code(), error = %err, "product update rejected");
        })?;
        let product = self.store.update_details(id, &update, occurred_at)?;
        tracing::info!(price = product.price(), category = %product.category(), "product updated");
        Ok(product)
    }

    pub fn get(&self, id: ProductId) -> DomainResult<Product> {
        self.store
            .get(id)?
            .ok_or_else(|| DomainError::not_found(Product::KIND, id))
    }

    /// Remove `quantity` units; fails without change if stock is insufficient.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub fn decrement(
        &self,
        id: ProductId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Product> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.apply(id, -quantity, occurred_at)
    }

    /// Return `quantity` units to stock.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub fn increment(
        &self,
        id: ProductId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Product> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.apply(id, quantity, occurred_at)
    }

    /// Signed stock correction (receiving goods, shrinkage, recounts).
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub fn adjust_stock(
        &self,
        id: ProductId,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Product> {
        if delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        self.apply(id, delta, occurred_at)
    }

    /// Products at or below their minimum stock level.
    pub fn low_stock(&self) -> DomainResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .store
            .list()?
            .into_iter()
            .filter(Product::is_low_stock)
            .collect();
        products.sort_by(|a, b| a.stock().cmp(&b.stock()).then_with(|| a.name().cmp(b.name())));
        Ok(products)
    }

    pub fn by_category(&self, category: &str) -> DomainResult<Vec<Product>> {
        if category.trim().is_empty() {
            return Err(DomainError::validation("category is required"));
        }
        Ok(self.store.list_by_category(category)?)
    }

    fn apply(&self, id: ProductId, delta: i64, occurred_at: DateTime<Utc>) -> DomainResult<Product> {
        if id.is_nil() {
            return Err(DomainError::validation("product id is required"));
        }

        match self.store.adjust_stock(id, delta, occurred_at) {
            Ok(product) => {
                tracing::debug!(delta, stock = product.stock(), "stock adjusted");
                Ok(product)
            }
            Err(StoreError::Insufficient {
                requested,
                available,
                ..
            }) => {
                // Name the product in the rejection; fall back to the id if the lookup fails.
                let product = match self.store.get(id) {
                    Ok(Some(p)) => p.name().to_string(),
                    _ => id.to_string(),
                };
                tracing::warn!(%product, requested, available, "insufficient stock");
                Err(DomainError::InsufficientStock {
                    product,
                    requested,
                    available,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
