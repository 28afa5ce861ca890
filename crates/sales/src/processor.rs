use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use smartstore_core::{DomainError, DomainResult, Entity, ProductId, SaleId};
use smartstore_inventory::{InventoryLedger, ProductStore};

use crate::sale::{CreateSale, Sale, SaleItem, TimeOfDay, co2_saved};
use crate::store::SaleStore;

/// A stock decrement already applied by the running sale.
#[derive(Debug, Clone)]
struct AppliedDecrement {
    product_id: ProductId,
    name: String,
    quantity: i64,
}

/// Records sales and keeps stock consistent with them.
///
/// `create_sale` runs as a saga: each line decrements stock atomically, and
/// if a later line or the final write fails, the applied decrements are
/// undone in reverse order.
#[derive(Debug)]
pub struct SaleTransactionProcessor<P, S> {
    ledger: InventoryLedger<P>,
    sales: S,
    offset: FixedOffset,
}

impl<P, S> SaleTransactionProcessor<P, S>
where
    P: ProductStore,
    S: SaleStore,
{
    /// `offset` is the store-local UTC offset used for time buckets and days.
    pub fn new(ledger: InventoryLedger<P>, sales: S, offset: FixedOffset) -> Self {
        Self {
            ledger,
            sales,
            offset,
        }
    }

    pub fn ledger(&self) -> &InventoryLedger<P> {
        &self.ledger
    }

    #[tracing::instrument(skip(self, cmd), fields(lines = cmd.items.len(), payment_method = %cmd.payment_method))]
    pub fn create_sale(&self, cmd: CreateSale) -> DomainResult<Sale> {
        cmd.validate().inspect_err(|err| {
            tracing::warn!(code = err.code(), error = %err, "sale rejected");
        })?;

        let at = cmd.occurred_at;
        let mut applied: Vec<AppliedDecrement> = Vec::with_capacity(cmd.items.len());
        let mut items = Vec::with_capacity(cmd.items.len());
        let mut co2_lines = Vec::with_capacity(cmd.items.len());

        for line in &cmd.items {
            let product = match self.ledger.decrement(line.product_id, line.quantity, at) {
                Ok(product) => product,
                Err(err) => return Err(self.compensate(applied, err, at)),
            };
            applied.push(AppliedDecrement {
                product_id: line.product_id,
                name: product.name().to_string(),
                quantity: line.quantity,
            });
            items.push(SaleItem {
                product_id: line.product_id,
                quantity: line.quantity,
                price_at_sale: product.price(),
            });
            co2_lines.push((line.quantity, product.co2_emission()));
        }

        let sale = match Sale::record(
            SaleId::new(),
            items,
            co2_saved(co2_lines),
            cmd.payment_method.trim(),
            at,
            self.offset,
        ) {
            Ok(sale) => sale,
            Err(err) => return Err(self.compensate(applied, err, at)),
        };

        if let Err(err) = self.sales.create(sale.clone()) {
            let err = DomainError::from(err);
            tracing::error!(error = %err, "sale write failed");
            return Err(self.compensate(applied, err, at));
        }

        tracing::info!(
            sale_id = %sale.id_typed(),
            total_amount = sale.total_amount(),
            total_co2_saved = sale.total_co2_saved(),
            time_of_day = %sale.time_of_day(),
            "sale recorded"
        );
        Ok(sale)
    }

    /// Sales made on the store-local calendar day `date`.
    pub fn daily_sales(&self, date: NaiveDate) -> DomainResult<Vec<Sale>> {
        let start = date
            .and_time(NaiveTime::MIN)
            .and_local_timezone(self.offset)
            .single()
            .ok_or_else(|| DomainError::validation(format!("invalid local date {date}")))?
            .with_timezone(&Utc);
        self.sales_by_date_range(start, start + Duration::days(1))
    }

    /// Half-open `[start, end)`, oldest first.
    pub fn sales_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Sale>> {
        if end < start {
            return Err(DomainError::validation("end must not be before start"));
        }
        let mut sales = self.sales.list_by_range(start, end)?;
        sales.sort_by_key(|s| s.created_at());
        Ok(sales)
    }

    pub fn sales_by_time_of_day(&self, bucket: TimeOfDay) -> DomainResult<Vec<Sale>> {
        Ok(self.sales.list_by_time_of_day(bucket)?)
    }

    pub fn get_sale(&self, id: SaleId) -> DomainResult<Sale> {
        if id.is_nil() {
            return Err(DomainError::validation("sale id is required"));
        }
        self.sales
            .get(id)?
            .ok_or_else(|| DomainError::not_found(Sale::KIND, id))
    }

    /// Undo `applied` in reverse order and return the error to surface.
    ///
    /// If every increment succeeds the original cause is returned unchanged;
    /// otherwise `PartialFailure` names the stock that is still decremented.
    fn compensate(
        &self,
        applied: Vec<AppliedDecrement>,
        cause: DomainError,
        at: DateTime<Utc>,
    ) -> DomainError {
        if applied.is_empty() {
            tracing::warn!(code = cause.code(), error = %cause, "sale rejected");
            return cause;
        }

        let mut left_applied = Vec::new();
        for step in applied.into_iter().rev() {
            if let Err(err) = self.ledger.increment(step.product_id, step.quantity, at) {
                tracing::error!(
                    product_id = %step.product_id,
                    quantity = step.quantity,
                    error = %err,
                    "stock compensation failed"
                );
                left_applied.push(format!("{} ({}) -{}", step.name, step.product_id, step.quantity));
            }
        }

        if left_applied.is_empty() {
            tracing::warn!(code = cause.code(), error = %cause, "sale rolled back");
            cause
        } else {
            DomainError::PartialFailure {
                cause: cause.to_string(),
                applied: left_applied,
            }
        }
    }
}
