use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use smartstore_core::{DomainError, DomainResult, Entity, ProductId};

/// Catalog product with its sellable stock.
///
/// Stock only changes through [`Product::apply_stock_delta`], which refuses
/// any change that would take it below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    /// Price in smallest currency unit (e.g. yen).
    price: u64,
    stock: i64,
    category: String,
    description: String,
    /// CO2 emission per unit (kg).
    co2_emission: f64,
    recycle_rate: f64,
    shelf_location: String,
    min_stock_level: i64,
    reorder_point: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Command: register a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: u64,
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub co2_emission: f64,
    #[serde(default)]
    pub recycle_rate: f64,
    #[serde(default)]
    pub shelf_location: String,
    #[serde(default)]
    pub min_stock_level: i64,
    #[serde(default)]
    pub reorder_point: i64,
}

/// Command: change catalog details. Unset fields keep their value; stock is
/// not editable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<u64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub co2_emission: Option<f64>,
    pub recycle_rate: Option<f64>,
    pub shelf_location: Option<String>,
    pub min_stock_level: Option<i64>,
    pub reorder_point: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("nothing to update"));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(co2) = self.co2_emission {
            validate_co2(co2)?;
        }
        if let Some(rate) = self.recycle_rate {
            validate_recycle_rate(rate)?;
        }
        validate_levels(
            self.min_stock_level.unwrap_or(0),
            self.reorder_point.unwrap_or(0),
        )
    }
}

/// Stock change refused because the result would be negative.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub requested: i64,
    pub available: i64,
}

impl Product {
    /// Validate a registration command and build the product.
    pub fn register(id: ProductId, cmd: NewProduct, occurred_at: DateTime<Utc>) -> DomainResult<Self> {
        if id.is_nil() {
            return Err(DomainError::validation("product id is required"));
        }
        validate_name(&cmd.name)?;
        if cmd.stock < 0 {
            return Err(DomainError::validation("stock must be non-negative"));
        }
        validate_co2(cmd.co2_emission)?;
        validate_recycle_rate(cmd.recycle_rate)?;
        validate_levels(cmd.min_stock_level, cmd.reorder_point)?;

        Ok(Self {
            id,
            name: cmd.name,
            price: cmd.price,
            stock: cmd.stock,
            category: cmd.category,
            description: cmd.description,
            co2_emission: cmd.co2_emission,
            recycle_rate: cmd.recycle_rate,
            shelf_location: cmd.shelf_location,
            min_stock_level: cmd.min_stock_level,
            reorder_point: cmd.reorder_point,
            created_at: occurred_at,
            updated_at: occurred_at,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn co2_emission(&self) -> f64 {
        self.co2_emission
    }

    pub fn recycle_rate(&self) -> f64 {
        self.recycle_rate
    }

    pub fn shelf_location(&self) -> &str {
        &self.shelf_location
    }

    pub fn min_stock_level(&self) -> i64 {
        self.min_stock_level
    }

    pub fn reorder_point(&self) -> i64 {
        self.reorder_point
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// At or below the configured minimum stock level.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock_level
    }

    /// Apply a signed stock change, returning the new stock.
    ///
    /// Leaves the product untouched when the result would be negative.
    pub fn apply_stock_delta(
        &mut self,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<i64, StockShortfall> {
        let next = self.stock.checked_add(delta).filter(|s| *s >= 0).ok_or(StockShortfall {
            requested: delta.saturating_neg(),
            available: self.stock,
        })?;
        self.stock = next;
        self.updated_at = occurred_at;
        Ok(next)
    }

    /// Apply a validated [`ProductUpdate`]. Stock is left as is.
    pub fn apply_update(&mut self, update: &ProductUpdate, occurred_at: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = &update.category {
            self.category.clone_from(category);
        }
        if let Some(description) = &update.description {
            self.description.clone_from(description);
        }
        if let Some(co2) = update.co2_emission {
            self.co2_emission = co2;
        }
        if let Some(rate) = update.recycle_rate {
            self.recycle_rate = rate;
        }
        if let Some(shelf) = &update.shelf_location {
            self.shelf_location.clone_from(shelf);
        }
        if let Some(level) = update.min_stock_level {
            self.min_stock_level = level;
        }
        if let Some(point) = update.reorder_point {
            self.reorder_point = point;
        }
        self.updated_at = occurred_at;
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("product name is required"));
    }
    Ok(())
}

fn validate_co2(co2: f64) -> DomainResult<()> {
    if !co2.is_finite() || co2 < 0.0 {
        return Err(DomainError::validation("co2 emission must be a non-negative number"));
    }
    Ok(())
}

fn validate_recycle_rate(rate: f64) -> DomainResult<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(DomainError::validation("recycle rate must be within 0..=1"));
    }
    Ok(())
}

fn validate_levels(min_stock_level: i64, reorder_point: i64) -> DomainResult<()> {
    if min_stock_level < 0 || reorder_point < 0 {
        return Err(DomainError::validation(
            "min stock level and reorder point must be non-negative",
        ));
    }
    Ok(())
}

impl Entity for Product {
    type Id = ProductId;

    const KIND: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn new_product(name: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: 1000,
            stock,
            category: "grocery".to_string(),
            description: String::new(),
            co2_emission: 5.0,
            recycle_rate: 0.5,
            shelf_location: "A-1".to_string(),
            min_stock_level: 2,
            reorder_point: 5,
        }
    }

    #[test]
    fn register_rejects_blank_name_and_negative_stock() {
        let err = Product::register(ProductId::new(), new_product("  ", 1), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("name")));

        let err = Product::register(ProductId::new(), new_product("Tea", -1), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("stock")));
    }

    #[test]
    fn register_rejects_out_of_range_recycle_rate() {
        let mut cmd = new_product("Tea", 1);
        cmd.recycle_rate = 1.5;
        assert!(Product::register(ProductId::new(), cmd, Utc::now()).is_err());
    }

    #[test]
    fn stock_delta_never_goes_negative() {
        let mut product = Product::register(ProductId::new(), new_product("Tea", 3), Utc::now()).unwrap();
        assert_eq!(product.apply_stock_delta(-2, Utc::now()), Ok(1));

        let shortfall = product.apply_stock_delta(-2, Utc::now()).unwrap_err();
        assert_eq!(shortfall, StockShortfall { requested: 2, available: 1 });
        assert_eq!(product.stock(), 1);
        assert!(product.is_low_stock());
    }

    #[test]
    fn update_changes_details_but_not_stock() {
        let at = Utc::now();
        let mut product = Product::register(ProductId::new(), new_product("Tea", 3), at).unwrap();
        let update = ProductUpdate {
            price: Some(1500),
            category: Some("beverages".to_string()),
            ..ProductUpdate::default()
        };
        update.validate().unwrap();
        product.apply_update(&update, at + chrono::Duration::minutes(1));

        assert_eq!(product.price(), 1500);
        assert_eq!(product.category(), "beverages");
        assert_eq!(product.name(), "Tea");
        assert_eq!(product.stock(), 3);
        assert!(product.updated_at() > at);
    }

    #[test]
    fn update_validation_rejects_empty_and_invalid_fields() {
        assert!(ProductUpdate::default().validate().is_err());

        let blank = ProductUpdate {
            name: Some(" ".to_string()),
            ..ProductUpdate::default()
        };
        assert!(matches!(blank.validate(), Err(DomainError::Validation(msg)) if msg.contains("name")));

        let negative = ProductUpdate {
            reorder_point: Some(-1),
            ..ProductUpdate::default()
        };
        assert!(negative.validate().is_err());

        let nan = ProductUpdate {
            co2_emission: Some(f64::NAN),
            ..ProductUpdate::default()
        };
        assert!(nan.validate().is_err());
    }
}
