//! 计费引擎
//!
//! 一张订单至多一张账单。并发开票由两道闸口封死：进程内按订单号
//! 互斥 (先到先得，后到者在预检查处拿到 AlreadyBilled)，存储层
//! `idx_bill_order` 唯一索引兜底跨进程场景。
//!
//! 金额链: discounted = total − discount; tax = discounted × 10%;
//! final = discounted + tax。全程精确十进制。

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::models::{BillDetails, BillSummary, OrderStatus};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use super::money;
use crate::core::{AppError, AppResult};
use crate::db::repository::{bill, order, payment, RepoError};

pub struct BillingEngine {
    pool: SqlitePool,
    /// Per-order serialization of generate_bill.
    order_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl BillingEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            order_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, order_id: i64) -> Arc<Mutex<()>> {
        self.order_locks
            .entry(order_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Generate the bill for an order and mark the order `Completed`,
    /// atomically. Exactly one caller ever succeeds per order.
    pub async fn generate_bill(&self, order_id: i64, discount: Decimal) -> AppResult<BillSummary> {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let mut tx = self.pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;

        // 事务第一条语句必须是写 (见 order::touch)；顺带完成存在性检查
        if !order::touch(&mut *tx, order_id).await? {
            return Err(AppError::NotFound(format!("Order {order_id} not found")));
        }

        let Some(order_row) = order::find_by_id(&mut *tx, order_id).await? else {
            return Err(AppError::NotFound(format!("Order {order_id} not found")));
        };

        let status: OrderStatus = order_row
            .status
            .parse()
            .map_err(|e: String| AppError::database(e))?;
        if !status.is_billable() {
            return Err(AppError::InvalidState(format!(
                "Order status is '{status}'; only Ready or Completed orders can be billed"
            )));
        }

        if bill::find_by_order(&mut *tx, order_id).await?.is_some() {
            return Err(AppError::AlreadyBilled(order_id));
        }

        let items = order::list_items(&mut *tx, order_id).await?;
        let mut total = Decimal::ZERO;
        for item in &items {
            total += item.line_total()?;
        }

        if discount.is_sign_negative() || discount > total {
            return Err(AppError::InvalidDiscount(format!(
                "Discount {discount} must be between 0 and the order total {total}"
            )));
        }

        let discounted = total - discount;
        let tax = money::tax_on(discounted);
        let final_amount = discounted + tax;

        let new_bill = bill::NewBill {
            id: shared::util::snowflake_id(),
            order_id,
            total,
            discount,
            tax,
            final_amount,
        };
        match bill::insert(&mut *tx, &new_bill).await {
            Ok(()) => {}
            // 唯一索引兜住了进程外并发竞争
            Err(RepoError::Duplicate(_)) => return Err(AppError::AlreadyBilled(order_id)),
            Err(e) => return Err(e.into()),
        }

        order::set_status(&mut *tx, order_id, OrderStatus::Completed).await?;

        tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(
            bill_id = new_bill.id,
            order_id,
            %total,
            %discount,
            %tax,
            %final_amount,
            "Bill generated"
        );

        Ok(BillSummary {
            bill_id: new_bill.id,
            order_id,
            total,
            discount,
            tax,
            final_amount,
        })
    }

    /// Full bill view with the balance derived from payments on every read.
    pub async fn bill_details(&self, bill_id: i64) -> AppResult<BillDetails> {
        let Some(bill_row) = bill::find_by_id(&self.pool, bill_id).await? else {
            return Err(AppError::NotFound(format!("Bill {bill_id} not found")));
        };

        let order_type = match order::find_by_id(&self.pool, bill_row.order_id).await? {
            Some(order_row) => order_row.order_type,
            None => {
                return Err(AppError::database(format!(
                    "Bill {bill_id} references missing order {}",
                    bill_row.order_id
                )))
            }
        };

        let amount_paid = payment::sum_paid(&self.pool, bill_id).await?;
        let final_amount = bill_row.final_amount()?;

        Ok(BillDetails {
            bill_id: bill_row.id,
            order_id: bill_row.order_id,
            order_type,
            total: bill_row.total()?,
            discount: bill_row.discount()?,
            tax: bill_row.tax()?,
            final_amount,
            amount_paid,
            balance_due: final_amount - amount_paid,
            billed_at: bill_row.created_at,
        })
    }
}
