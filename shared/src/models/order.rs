//! Order types
//!
//! An order is created `Pending`, moved to `Ready` by the kitchen side
//! (outside this backend's scope), and reaches `Completed` only through
//! billing. Line-item prices are captured at order time and never change
//! afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Ready => "Ready",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Billing is only permitted once preparation is finished.
    pub fn is_billable(&self) -> bool {
        matches!(self, Self::Ready | Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Ready" => Ok(Self::Ready),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown order status: {other}")),
        }
    }
}

/// One requested line item. The client names the menu item and a quantity;
/// the unit price is always resolved server-side from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: i64,
    pub quantity: i32,
}

/// CREATE_ORDER 请求参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// 订单类型 (例如: "DineIn", "TakeAway")
    pub order_type: String,
    /// 下单员工
    pub employee_id: i64,
    /// 订单行项目
    pub items: Vec<OrderItemInput>,
}

/// CREATE_ORDER / GET_ORDER_TOTAL 响应数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: i64,
    pub total: Decimal,
    pub item_count: i64,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(s.as_str().parse::<OrderStatus>().unwrap(), s);
        }
        assert!("Paid".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn only_ready_and_completed_are_billable() {
        assert!(!OrderStatus::Pending.is_billable());
        assert!(OrderStatus::Ready.is_billable());
        assert!(OrderStatus::Completed.is_billable());
        assert!(!OrderStatus::Cancelled.is_billable());
    }
}
