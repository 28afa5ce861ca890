use std::collections::HashMap;

use chrono::{DateTime, Utc};

use smartstore_core::{DomainError, DomainResult, ProductId};
use smartstore_inventory::ProductStore;
use smartstore_operations::StoreOperationStore;
use smartstore_sales::{Sale, SaleStore};

use crate::report::{
    CategorySales, EnergyUsageAnalytics, EnvironmentalImpact, SalesAnalytics, UNCATEGORIZED,
};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Computes reports over a time window straight from the stores.
#[derive(Debug)]
pub struct AnalyticsAggregator<P, S, O> {
    products: P,
    sales: S,
    operations: O,
}

impl<P, S, O> AnalyticsAggregator<P, S, O>
where
    P: ProductStore,
    S: SaleStore,
    O: StoreOperationStore,
{
    pub fn new(products: P, sales: S, operations: O) -> Self {
        Self {
            products,
            sales,
            operations,
        }
    }

    /// CO2 saved by sales in `[start, end)`; the per-item average is over sale lines.
    #[tracing::instrument(skip(self))]
    pub fn environmental_impact(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<EnvironmentalImpact> {
        let sales = self.sales_in(start, end)?;
        let total_co2_saved: f64 = sales.iter().map(Sale::total_co2_saved).sum();
        let items: usize = sales.iter().map(|s| s.items().len()).sum();

        Ok(EnvironmentalImpact {
            total_co2_saved,
            average_co2_saved_per_item: if items == 0 {
                0.0
            } else {
                total_co2_saved / items as f64
            },
            total_eco_friendly_items: items,
        })
    }

    /// Units sold per category, resolving categories as they are now.
    #[tracing::instrument(skip(self))]
    pub fn sales_by_category(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<CategorySales> {
        let sales = self.sales_in(start, end)?;
        let mut categories: HashMap<ProductId, String> = HashMap::new();
        let mut totals = CategorySales::new();

        for item in sales.iter().flat_map(|s| s.items()) {
            let category = match categories.get(&item.product_id) {
                Some(category) => category.clone(),
                None => {
                    let category = self
                        .products
                        .get(item.product_id)?
                        .map(|p| p.category().to_string())
                        .unwrap_or_else(|| UNCATEGORIZED.to_string());
                    categories.insert(item.product_id, category.clone());
                    category
                }
            };
            *totals.entry(category).or_insert(0) += item.quantity;
        }
        Ok(totals)
    }

    /// Average draw per system across samples in `[start, end)`.
    #[tracing::instrument(skip(self))]
    pub fn energy_usage(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<EnergyUsageAnalytics> {
        if end <= start {
            return Err(DomainError::validation("time range must be greater than zero"));
        }
        let window = (end - start)
            .to_std()
            .map_err(|_| DomainError::validation("time range is out of range"))?;
        let averages = self.operations.average_usage(start, end)?;
        let hours = window.as_secs_f64() / SECONDS_PER_HOUR;
        let total_usage = averages.total();

        tracing::debug!(samples = averages.samples, hours, "energy usage aggregated");
        Ok(EnergyUsageAnalytics {
            average_lighting_usage: averages.lighting,
            average_ac_usage: averages.ac,
            average_refrig_usage: averages.refrig,
            total_usage,
            usage_per_hour: total_usage / hours,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn sales_analytics(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<SalesAnalytics> {
        let sales = self.sales_in(start, end)?;
        let mut report = SalesAnalytics {
            total_sales: sales.len(),
            total_amount: sum_amounts(&sales)?,
            ..SalesAnalytics::default()
        };
        for sale in &sales {
            *report.time_of_day_sales.entry(sale.time_of_day()).or_insert(0) += 1;
            *report.weekday_sales.entry(sale.weekday()).or_insert(0) += 1;
            report.total_co2_saved += sale.total_co2_saved();
        }
        Ok(report)
    }

    pub fn total_sales_amount(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<u64> {
        sum_amounts(&self.sales_in(start, end)?)
    }

    fn sales_in(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Vec<Sale>> {
        if end < start {
            return Err(DomainError::validation("end must not be before start"));
        }
        Ok(self.sales.list_by_range(start, end)?)
    }
}

fn sum_amounts(sales: &[Sale]) -> DomainResult<u64> {
    sales
        .iter()
        .try_fold(0u64, |acc, s| acc.checked_add(s.total_amount()))
        .ok_or_else(|| DomainError::validation("sales total overflows"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, FixedOffset, TimeZone, Weekday};
    use proptest::prelude::*;
    use smartstore_core::{SaleId, StoreError, StoreOperationId, StoreResult};
    use smartstore_inventory::{NewProduct, Product, ProductUpdate};
    use smartstore_operations::{
        CheckoutStatus, EnergyAverages, NewStoreOperation, ShelfStatus, StoreOperation,
    };
    use smartstore_sales::{SaleItem, TimeOfDay};

    use super::*;

    #[derive(Debug, Default)]
    struct Fixture {
        products: Mutex<Vec<Product>>,
        sales: Mutex<Vec<Sale>>,
        ops: Mutex<Vec<StoreOperation>>,
    }

    impl ProductStore for Fixture {
        fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
            Ok(self.products.lock().unwrap().iter().find(|p| p.id_typed() == id).cloned())
        }

        fn insert(&self, product: Product) -> StoreResult<()> {
            self.products.lock().unwrap().push(product);
            Ok(())
        }

        fn update_details(
            &self,
            id: ProductId,
            update: &ProductUpdate,
            at: DateTime<Utc>,
        ) -> StoreResult<Product> {
            let mut products = self.products.lock().unwrap();
            let product = products
                .iter_mut()
                .find(|p| p.id_typed() == id)
                .ok_or_else(|| StoreError::not_found("product", id))?;
            product.apply_update(update, at);
            Ok(product.clone())
        }

        fn list(&self) -> StoreResult<Vec<Product>> {
            Ok(self.products.lock().unwrap().clone())
        }

        fn list_by_category(&self, category: &str) -> StoreResult<Vec<Product>> {
            Ok(self.list()?.into_iter().filter(|p| p.category() == category).collect())
        }

        fn adjust_stock(&self, id: ProductId, _: i64, _: DateTime<Utc>) -> StoreResult<Product> {
            Err(StoreError::not_found("product", id))
        }
    }

    impl SaleStore for Fixture {
        fn create(&self, sale: Sale) -> StoreResult<()> {
            self.sales.lock().unwrap().push(sale);
            Ok(())
        }

        fn get(&self, id: SaleId) -> StoreResult<Option<Sale>> {
            Ok(self.sales.lock().unwrap().iter().find(|s| s.id_typed() == id).cloned())
        }

        fn list_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<Sale>> {
            Ok(self
                .sales
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.created_at() >= start && s.created_at() < end)
                .cloned()
                .collect())
        }

        fn list_by_time_of_day(&self, bucket: TimeOfDay) -> StoreResult<Vec<Sale>> {
            Ok(self
                .sales
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.time_of_day() == bucket)
                .cloned()
                .collect())
        }
    }

    impl StoreOperationStore for Fixture {
        fn create(&self, op: StoreOperation) -> StoreResult<()> {
            self.ops.lock().unwrap().push(op);
            Ok(())
        }

        fn get(&self, id: StoreOperationId) -> StoreResult<Option<StoreOperation>> {
            Ok(self.ops.lock().unwrap().iter().find(|o| o.id_typed() == id).cloned())
        }

        fn latest(&self) -> StoreResult<Option<StoreOperation>> {
            Ok(self.ops.lock().unwrap().last().cloned())
        }

        fn list_by_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> StoreResult<Vec<StoreOperation>> {
            Ok(self
                .ops
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.recorded_at() >= start && o.recorded_at() < end)
                .cloned()
                .collect())
        }

        fn update_shelf(
            &self,
            id: StoreOperationId,
            _: ShelfStatus,
            _: DateTime<Utc>,
        ) -> StoreResult<StoreOperation> {
            Err(StoreError::not_found("store operation", id))
        }

        fn update_checkout(
            &self,
            id: StoreOperationId,
            _: CheckoutStatus,
            _: DateTime<Utc>,
        ) -> StoreResult<StoreOperation> {
            Err(StoreError::not_found("store operation", id))
        }

        fn average_usage(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> StoreResult<EnergyAverages> {
            let ops = StoreOperationStore::list_by_range(self, start, end)?;
            Ok(EnergyAverages::from_samples(&ops))
        }
    }

    type Aggregator = AnalyticsAggregator<Arc<Fixture>, Arc<Fixture>, Arc<Fixture>>;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn product(fixture: &Fixture, category: &str) -> ProductId {
        let product = Product::register(
            ProductId::new(),
            NewProduct {
                name: format!("{category} item"),
                price: 100,
                stock: 10,
                category: category.to_string(),
                description: String::new(),
                co2_emission: 1.0,
                recycle_rate: 0.0,
                shelf_location: String::new(),
                min_stock_level: 0,
                reorder_point: 0,
            },
            t0(),
        )
        .unwrap();
        let id = product.id_typed();
        ProductStore::insert(fixture, product).unwrap();
        id
    }

    fn sell(fixture: &Fixture, lines: &[(ProductId, i64, u64)], co2: f64, at: DateTime<Utc>) {
        let items = lines
            .iter()
            .map(|(product_id, quantity, price)| SaleItem {
                product_id: *product_id,
                quantity: *quantity,
                price_at_sale: *price,
            })
            .collect();
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let sale = Sale::record(SaleId::new(), items, co2, "cash", at, jst).unwrap();
        SaleStore::create(fixture, sale).unwrap();
    }

    fn sample(fixture: &Fixture, at: DateTime<Utc>, lighting: f64, ac: f64, refrig: f64) {
        let op = StoreOperation::record(
            StoreOperationId::new(),
            NewStoreOperation {
                temperature: 21.0,
                humidity: 40.0,
                crowd_density: 0.1,
                shelves: vec![ShelfStatus {
                    shelf_id: "A-1".to_string(),
                    stock_level: 1,
                    temperature: 5.0,
                    last_checked: at,
                }],
                checkouts: vec![CheckoutStatus {
                    register_id: "R-1".to_string(),
                    is_operational: true,
                    queue_length: 0,
                    last_checked: at,
                }],
                lighting_usage: lighting,
                ac_usage: ac,
                refrig_usage: refrig,
                recorded_at: at,
            },
        )
        .unwrap();
        StoreOperationStore::create(fixture, op).unwrap();
    }

    fn aggregator(fixture: &Arc<Fixture>) -> Aggregator {
        AnalyticsAggregator::new(fixture.clone(), fixture.clone(), fixture.clone())
    }

    #[test]
    fn environmental_impact_averages_over_sale_lines() {
        let fixture = Arc::new(Fixture::default());
        let a = product(&fixture, "grocery");
        let b = product(&fixture, "household");
        sell(&fixture, &[(a, 2, 100), (b, 1, 300)], 6.0, t0());
        sell(&fixture, &[(a, 1, 100)], 3.0, t0() + Duration::hours(1));

        let impact = aggregator(&fixture)
            .environmental_impact(t0(), t0() + Duration::days(1))
            .unwrap();
        assert_eq!(impact.total_co2_saved, 9.0);
        assert_eq!(impact.total_eco_friendly_items, 3);
        assert_eq!(impact.average_co2_saved_per_item, 3.0);
    }

    #[test]
    fn environmental_impact_is_zero_without_sales() {
        let fixture = Arc::new(Fixture::default());
        let impact = aggregator(&fixture)
            .environmental_impact(t0(), t0() + Duration::days(1))
            .unwrap();
        assert_eq!(impact, EnvironmentalImpact::default());
        assert!(matches!(
            aggregator(&fixture).environmental_impact(t0(), t0() - Duration::days(1)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn sales_by_category_groups_missing_products_as_uncategorized() {
        let fixture = Arc::new(Fixture::default());
        let a = product(&fixture, "grocery");
        let gone = ProductId::new();
        sell(&fixture, &[(a, 2, 100), (gone, 4, 50)], 0.0, t0());
        sell(&fixture, &[(a, 3, 100)], 0.0, t0() + Duration::minutes(1));

        let by_category = aggregator(&fixture)
            .sales_by_category(t0(), t0() + Duration::days(1))
            .unwrap();
        assert_eq!(by_category.get("grocery"), Some(&5));
        assert_eq!(by_category.get(UNCATEGORIZED), Some(&4));
    }

    #[test]
    fn sales_by_category_follows_recategorised_products() {
        let fixture = Arc::new(Fixture::default());
        let a = product(&fixture, "grocery");
        sell(&fixture, &[(a, 2, 100)], 0.0, t0());

        let recategorise = ProductUpdate {
            category: Some("organic".to_string()),
            ..ProductUpdate::default()
        };
        ProductStore::update_details(&*fixture, a, &recategorise, t0()).unwrap();

        let by_category = aggregator(&fixture)
            .sales_by_category(t0(), t0() + Duration::days(1))
            .unwrap();
        assert_eq!(by_category.get("organic"), Some(&2));
        assert_eq!(by_category.get("grocery"), None);
    }

    #[test]
    fn energy_usage_rejects_empty_and_reversed_ranges() {
        let fixture = Arc::new(Fixture::default());
        let aggregator = aggregator(&fixture);
        assert!(matches!(aggregator.energy_usage(t0(), t0()), Err(DomainError::Validation(_))));
        assert!(matches!(
            aggregator.energy_usage(t0(), t0() - Duration::hours(1)),
            Err(DomainError::Validation(_))
        ));
        let empty = aggregator.energy_usage(t0(), t0() + Duration::hours(1)).unwrap();
        assert_eq!(empty, EnergyUsageAnalytics::default());
    }

    #[test]
    fn energy_usage_per_hour_uses_fractional_hours() {
        let fixture = Arc::new(Fixture::default());
        sample(&fixture, t0(), 2.0, 4.0, 6.0);
        sample(&fixture, t0() + Duration::minutes(10), 4.0, 8.0, 12.0);

        let report = aggregator(&fixture)
            .energy_usage(t0(), t0() + Duration::minutes(30))
            .unwrap();
        assert_eq!(report.average_lighting_usage, 3.0);
        assert_eq!(report.total_usage, 18.0);
        assert!((report.usage_per_hour - 36.0).abs() < 1e-9);
    }

    #[test]
    fn energy_usage_per_hour_is_finite_for_sub_millisecond_windows() {
        let fixture = Arc::new(Fixture::default());
        let aggregator = aggregator(&fixture);
        let end = t0() + Duration::microseconds(500);

        let empty = aggregator.energy_usage(t0(), end).unwrap();
        assert_eq!(empty.usage_per_hour, 0.0);

        sample(&fixture, t0(), 1.0, 1.0, 1.0);
        let report = aggregator.energy_usage(t0(), end).unwrap();
        assert!(report.usage_per_hour.is_finite());
        assert!((report.usage_per_hour - 3.0 * 7_200_000.0).abs() < 1e-3);

        let nanos = aggregator
            .energy_usage(t0(), t0() + Duration::nanoseconds(1))
            .unwrap();
        assert!(nanos.usage_per_hour.is_finite());
    }

    #[test]
    fn sales_analytics_counts_buckets() {
        let fixture = Arc::new(Fixture::default());
        let a = product(&fixture, "grocery");
        // 2024-05-01 is a Wednesday; 03:00 UTC is 12:00 in Tokyo.
        let lunch = t0() + Duration::hours(3);
        sell(&fixture, &[(a, 1, 100)], 1.0, lunch);
        sell(&fixture, &[(a, 2, 100)], 2.0, lunch + Duration::minutes(30));

        let aggregator = aggregator(&fixture);
        let report = aggregator.sales_analytics(t0(), t0() + Duration::days(1)).unwrap();
        assert_eq!(report.total_sales, 2);
        assert_eq!(report.total_amount, 300);
        assert_eq!(report.time_of_day_sales.get(&TimeOfDay::Lunch), Some(&2));
        assert_eq!(report.weekday_sales.get(&Weekday::Wed), Some(&2));
        assert_eq!(report.total_co2_saved, 3.0);
        assert_eq!(aggregator.total_sales_amount(t0(), lunch).unwrap(), 0);
    }

    proptest! {
        /// Property: category totals account for every unit sold in the window.
        #[test]
        fn category_totals_cover_all_units(quantities in prop::collection::vec(1i64..50, 1..30)) {
            let fixture = Arc::new(Fixture::default());
            let ids = [product(&fixture, "grocery"), product(&fixture, "household")];
            for (i, q) in quantities.iter().enumerate() {
                sell(&fixture, &[(ids[i % 2], *q, 10)], 0.0, t0() + Duration::seconds(i as i64));
            }
            let totals = aggregator(&fixture)
                .sales_by_category(t0(), t0() + Duration::days(1))
                .unwrap();
            prop_assert_eq!(totals.values().sum::<i64>(), quantities.iter().sum::<i64>());
        }
    }
}
