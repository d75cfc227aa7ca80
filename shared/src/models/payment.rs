//! Payment types
//!
//! Payments are append-only: created by the payment processor, never mutated
//! or deleted. Several payments may reference the same bill (installments).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of supported payment methods.
///
/// Each variant owns its transaction-id format, so a generated id is always
/// distinguishable by method (see the payment processor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Online => "Online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    /// 方法名大小写不敏感 ("CASH" == "cash" == "Cash")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "online" => Ok(Self::Online),
            other => Err(format!("Unknown payment method: {other}")),
        }
    }
}

/// MAKE_PAYMENT 请求参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakePaymentRequest {
    pub bill_id: i64,
    /// 支付方式，大小写不敏感
    pub method: String,
    pub amount: Decimal,
    /// 外部交易号；缺省时由服务端按支付方式生成
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// GET_PAYMENT_HISTORY 响应的单条记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: i64,
    pub bill_id: i64,
    pub method: PaymentMethod,
    pub amount_paid: Decimal,
    pub transaction_id: String,
    /// 支付时间 (UTC 毫秒)
    pub paid_at: i64,
}
