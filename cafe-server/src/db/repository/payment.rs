//! Payment Repository
//!
//! Append-only payment rows. The balance due of a bill is always recomputed
//! from these rows, never cached in a column that could drift.

use super::{parse_money, RepoResult};
use rust_decimal::Decimal;
use shared::models::{PaymentMethod, PaymentRecord};
use sqlx::sqlite::Sqlite;
use sqlx::Executor;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: i64,
    pub bill_id: i64,
    pub method: String,
    pub amount_paid: String,
    pub transaction_id: String,
    pub paid_at: i64,
}

impl PaymentRow {
    pub fn into_record(self) -> RepoResult<PaymentRecord> {
        let method: PaymentMethod = self
            .method
            .parse()
            .map_err(super::RepoError::Database)?;
        Ok(PaymentRecord {
            payment_id: self.id,
            bill_id: self.bill_id,
            method,
            amount_paid: parse_money(&self.amount_paid)?,
            transaction_id: self.transaction_id,
            paid_at: self.paid_at,
        })
    }
}

pub async fn insert<'e, E>(
    executor: E,
    id: i64,
    bill_id: i64,
    method: PaymentMethod,
    amount_paid: Decimal,
    transaction_id: &str,
    paid_at: i64,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO payment (id, bill_id, method, amount_paid, transaction_id, paid_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(bill_id)
    .bind(method.as_str())
    .bind(amount_paid.to_string())
    .bind(transaction_id)
    .bind(paid_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// All payments for a bill, most recent first.
pub async fn list_by_bill<'e, E>(executor: E, bill_id: i64) -> RepoResult<Vec<PaymentRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, PaymentRow>(
        "SELECT id, bill_id, method, amount_paid, transaction_id, paid_at FROM payment WHERE bill_id = ? ORDER BY paid_at DESC, id DESC",
    )
    .bind(bill_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Σ amount_paid over a bill's payments, computed in exact decimals.
pub async fn sum_paid<'e, E>(executor: E, bill_id: i64) -> RepoResult<Decimal>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT amount_paid FROM payment WHERE bill_id = ?")
            .bind(bill_id)
            .fetch_all(executor)
            .await?;
    let mut sum = Decimal::ZERO;
    for (raw,) in rows {
        sum += parse_money(&raw)?;
    }
    Ok(sum)
}
