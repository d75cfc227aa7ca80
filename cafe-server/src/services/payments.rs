//! 支付处理器
//!
//! 支付记录只追加不修改。交易号: 客户端提供则原样保存，否则按
//! 支付方式生成带前缀的交易号 (CASH-时间戳 / CARD-10位十六进制 /
//! ONLINE-12位十六进制)，肉眼即可区分来源。
//!
//! 超额支付照常入账，余额变为负数表示挂账/找零，由上层业务处理。

use chrono::Utc;
use rust_decimal::Decimal;
use shared::models::{MakePaymentRequest, PaymentMethod, PaymentRecord};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::{AppError, AppResult};
use crate::db::repository::{bill, payment};

pub struct PaymentProcessor {
    pool: SqlitePool,
}

impl PaymentProcessor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record one payment against an existing bill.
    pub async fn record_payment(&self, req: &MakePaymentRequest) -> AppResult<PaymentRecord> {
        if req.amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(format!(
                "Payment amount must be positive, got {}",
                req.amount
            )));
        }

        let method: PaymentMethod = req
            .method
            .parse()
            .map_err(|_| AppError::UnknownPaymentMethod(req.method.clone()))?;

        if bill::find_by_id(&self.pool, req.bill_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Bill {} not found", req.bill_id)));
        }

        let transaction_id = match req.transaction_id.as_deref() {
            Some(supplied) if !supplied.trim().is_empty() => supplied.to_string(),
            _ => generate_transaction_id(method),
        };

        let payment_id = shared::util::snowflake_id();
        let paid_at = shared::util::now_millis();
        payment::insert(
            &self.pool,
            payment_id,
            req.bill_id,
            method,
            req.amount,
            &transaction_id,
            paid_at,
        )
        .await?;

        tracing::info!(
            payment_id,
            bill_id = req.bill_id,
            %method,
            amount = %req.amount,
            %transaction_id,
            "Payment recorded"
        );

        Ok(PaymentRecord {
            payment_id,
            bill_id: req.bill_id,
            method,
            amount_paid: req.amount,
            transaction_id,
            paid_at,
        })
    }

    /// All payments for a bill, most recent first. An unknown bill id just
    /// yields an empty history.
    pub async fn payment_history(&self, bill_id: i64) -> AppResult<Vec<PaymentRecord>> {
        let rows = payment::list_by_bill(&self.pool, bill_id).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row.into_record()?);
        }
        Ok(records)
    }
}

/// Method-specific transaction id.
fn generate_transaction_id(method: PaymentMethod) -> String {
    match method {
        // 现金按开单时刻标记，秒级足够
        PaymentMethod::Cash => format!("CASH-{}", Utc::now().format("%Y%m%d%H%M%S")),
        PaymentMethod::Card => format!("CARD-{}", &Uuid::new_v4().simple().to_string()[..10]),
        PaymentMethod::Online => format!("ONLINE-{}", &Uuid::new_v4().simple().to_string()[..12]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_ids_carry_method_markers() {
        let cash = generate_transaction_id(PaymentMethod::Cash);
        let card = generate_transaction_id(PaymentMethod::Card);
        let online = generate_transaction_id(PaymentMethod::Online);

        assert!(cash.starts_with("CASH-"));
        // CASH-yyyyMMddHHmmss
        assert_eq!(cash.len(), "CASH-".len() + 14);
        assert!(cash["CASH-".len()..].chars().all(|c| c.is_ascii_digit()));

        assert!(card.starts_with("CARD-"));
        assert_eq!(card.len(), "CARD-".len() + 10);
        assert!(card["CARD-".len()..].chars().all(|c| c.is_ascii_hexdigit()));

        assert!(online.starts_with("ONLINE-"));
        assert_eq!(online.len(), "ONLINE-".len() + 12);
        assert!(online["ONLINE-".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_ids_are_unique_per_call() {
        let a = generate_transaction_id(PaymentMethod::Card);
        let b = generate_transaction_id(PaymentMethod::Card);
        assert_ne!(a, b);
    }
}
