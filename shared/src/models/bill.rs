//! Bill types
//!
//! At most one bill ever exists per order; a bill is immutable once written.
//! `balance_due` is derived from the payment set on every read, never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GENERATE_BILL 请求参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateBillRequest {
    pub order_id: i64,
    /// 折扣金额 (绝对值，非百分比)，缺省为 0
    #[serde(default)]
    pub discount: Decimal,
}

/// GENERATE_BILL 响应数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSummary {
    pub bill_id: i64,
    pub order_id: i64,
    pub total: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub final_amount: Decimal,
}

/// GET_BILL_DETAILS 响应数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDetails {
    pub bill_id: i64,
    pub order_id: i64,
    pub order_type: String,
    pub total: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub final_amount: Decimal,
    /// Σ payments.amount_paid, recomputed on every read
    pub amount_paid: Decimal,
    /// final_amount − amount_paid; negative means overpayment/credit
    pub balance_due: Decimal,
    /// 开票时间 (UTC 毫秒)
    pub billed_at: i64,
}
