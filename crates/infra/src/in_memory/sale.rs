use chrono::{DateTime, Utc};

use smartstore_core::{SaleId, StoreResult};
use smartstore_sales::{Sale, SaleStore, TimeOfDay};

use super::table::Table;

#[derive(Debug, Default)]
pub struct InMemorySaleStore {
    sales: Table<Sale>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut sales: Vec<Sale>) -> Vec<Sale> {
        sales.sort_by_key(|s| (s.created_at(), *s.id_typed().as_uuid()));
        sales
    }
}

impl SaleStore for InMemorySaleStore {
    fn create(&self, sale: Sale) -> StoreResult<()> {
        self.sales.insert(sale)
    }

    fn get(&self, id: SaleId) -> StoreResult<Option<Sale>> {
        self.sales.get(&id)
    }

    fn list_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<Sale>> {
        let sales = self
            .sales
            .filter(|s| s.created_at() >= start && s.created_at() < end)?;
        Ok(Self::sorted(sales))
    }

    fn list_by_time_of_day(&self, bucket: TimeOfDay) -> StoreResult<Vec<Sale>> {
        Ok(Self::sorted(self.sales.filter(|s| s.time_of_day() == bucket)?))
    }
}
