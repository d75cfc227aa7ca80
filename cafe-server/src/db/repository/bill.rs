//! Bill Repository
//!
//! One row per billed order. `idx_bill_order` (UNIQUE on order_id) is the
//! storage-layer guarantee behind the at-most-one-bill invariant; an insert
//! racing past the engine's pre-check surfaces as [`RepoError::Duplicate`].

use super::{parse_money, RepoResult};
use rust_decimal::Decimal;
use sqlx::sqlite::Sqlite;
use sqlx::Executor;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillRow {
    pub id: i64,
    pub order_id: i64,
    pub total: String,
    pub discount: String,
    pub tax: String,
    pub final_amount: String,
    pub created_at: i64,
}

impl BillRow {
    pub fn total(&self) -> RepoResult<Decimal> {
        parse_money(&self.total)
    }

    pub fn discount(&self) -> RepoResult<Decimal> {
        parse_money(&self.discount)
    }

    pub fn tax(&self) -> RepoResult<Decimal> {
        parse_money(&self.tax)
    }

    pub fn final_amount(&self) -> RepoResult<Decimal> {
        parse_money(&self.final_amount)
    }
}

/// Amounts ready for insertion, already rounded by the billing engine.
#[derive(Debug, Clone)]
pub struct NewBill {
    pub id: i64,
    pub order_id: i64,
    pub total: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub final_amount: Decimal,
}

pub async fn insert<'e, E>(executor: E, bill: &NewBill) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO bill (id, order_id, total, discount, tax, final_amount, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(bill.id)
    .bind(bill.order_id)
    .bind(bill.total.to_string())
    .bind(bill.discount.to_string())
    .bind(bill.tax.to_string())
    .bind(bill.final_amount.to_string())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_by_id<'e, E>(executor: E, bill_id: i64) -> RepoResult<Option<BillRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, BillRow>(
        "SELECT id, order_id, total, discount, tax, final_amount, created_at FROM bill WHERE id = ?",
    )
    .bind(bill_id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub async fn find_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<Option<BillRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, BillRow>(
        "SELECT id, order_id, total, discount, tax, final_amount, created_at FROM bill WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}
