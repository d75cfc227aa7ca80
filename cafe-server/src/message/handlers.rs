//! Action handlers
//!
//! 每个处理器解码自己的参数并调用对应的领域服务。参数形状不匹配
//! (例如需要整数标识的地方传了字符串对象) 统一映射为 InvalidPayload。

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared::message::ResponsePayload;
use shared::models::{CreateOrderRequest, GenerateBillRequest, MakePaymentRequest};

use super::registry::ActionHandler;
use crate::core::{AppError, AppResult};
use crate::services::{BillingEngine, OrderLedger, PaymentProcessor};

/// Decode the params object into the handler's request type.
fn decode<T: DeserializeOwned>(params: Option<Value>) -> AppResult<T> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| AppError::InvalidPayload(e.to_string()))
}

/// 标识参数既接受裸数字 (`42`) 也接受带键的对象 (`{"order_id": 42}`)，
/// 与旧客户端的两种传法保持兼容。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdParam {
    Bare(i64),
    Keyed {
        #[serde(alias = "order_id", alias = "bill_id")]
        id: i64,
    },
}

fn decode_id(params: Option<Value>, what: &str) -> AppResult<i64> {
    match decode::<IdParam>(params) {
        Ok(IdParam::Bare(id)) | Ok(IdParam::Keyed { id }) => Ok(id),
        Err(_) => Err(AppError::InvalidPayload(format!(
            "Expected a numeric {what} identifier"
        ))),
    }
}

// ========== PING ==========

/// Liveness probe; takes no params.
pub struct PingHandler;

#[async_trait]
impl ActionHandler for PingHandler {
    fn action(&self) -> &'static str {
        "PING"
    }

    async fn handle(&self, _params: Option<Value>) -> AppResult<ResponsePayload> {
        Ok(ResponsePayload::success("Pong", None))
    }
}

// ========== CREATE_ORDER ==========

pub struct CreateOrderHandler {
    orders: Arc<OrderLedger>,
}

impl CreateOrderHandler {
    pub fn new(orders: Arc<OrderLedger>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl ActionHandler for CreateOrderHandler {
    fn action(&self) -> &'static str {
        "CREATE_ORDER"
    }

    async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload> {
        let request: CreateOrderRequest = decode(params)?;
        let summary = self.orders.create_order(&request).await?;
        Ok(ResponsePayload::success(
            format!(
                "Order #{} created successfully. Total: {}",
                summary.order_id, summary.total
            ),
            Some(serde_json::to_value(&summary).map_err(|e| AppError::internal(e.to_string()))?),
        ))
    }
}

// ========== GET_ORDER_TOTAL ==========

pub struct GetOrderTotalHandler {
    orders: Arc<OrderLedger>,
}

impl GetOrderTotalHandler {
    pub fn new(orders: Arc<OrderLedger>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl ActionHandler for GetOrderTotalHandler {
    fn action(&self) -> &'static str {
        "GET_ORDER_TOTAL"
    }

    async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload> {
        let order_id = decode_id(params, "order")?;
        let summary = self.orders.get_order_total(order_id).await?;
        Ok(ResponsePayload::success(
            "Order total calculated",
            Some(serde_json::to_value(&summary).map_err(|e| AppError::internal(e.to_string()))?),
        ))
    }
}

// ========== GENERATE_BILL ==========

pub struct GenerateBillHandler {
    billing: Arc<BillingEngine>,
}

impl GenerateBillHandler {
    pub fn new(billing: Arc<BillingEngine>) -> Self {
        Self { billing }
    }
}

#[async_trait]
impl ActionHandler for GenerateBillHandler {
    fn action(&self) -> &'static str {
        "GENERATE_BILL"
    }

    async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload> {
        let request: GenerateBillRequest = decode(params)?;
        let bill = self.billing.generate_bill(request.order_id, request.discount).await?;
        Ok(ResponsePayload::success(
            format!(
                "Bill #{} generated successfully. Final amount: {}",
                bill.bill_id, bill.final_amount
            ),
            Some(serde_json::to_value(&bill).map_err(|e| AppError::internal(e.to_string()))?),
        ))
    }
}

// ========== GET_BILL_DETAILS ==========

pub struct GetBillDetailsHandler {
    billing: Arc<BillingEngine>,
}

impl GetBillDetailsHandler {
    pub fn new(billing: Arc<BillingEngine>) -> Self {
        Self { billing }
    }
}

#[async_trait]
impl ActionHandler for GetBillDetailsHandler {
    fn action(&self) -> &'static str {
        "GET_BILL_DETAILS"
    }

    async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload> {
        let bill_id = decode_id(params, "bill")?;
        let details = self.billing.bill_details(bill_id).await?;
        Ok(ResponsePayload::success(
            "Bill details retrieved successfully",
            Some(serde_json::to_value(&details).map_err(|e| AppError::internal(e.to_string()))?),
        ))
    }
}

// ========== MAKE_PAYMENT ==========

pub struct MakePaymentHandler {
    payments: Arc<PaymentProcessor>,
}

impl MakePaymentHandler {
    pub fn new(payments: Arc<PaymentProcessor>) -> Self {
        Self { payments }
    }
}

#[async_trait]
impl ActionHandler for MakePaymentHandler {
    fn action(&self) -> &'static str {
        "MAKE_PAYMENT"
    }

    async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload> {
        let request: MakePaymentRequest = decode(params)?;
        let record = self.payments.record_payment(&request).await?;
        Ok(ResponsePayload::success(
            "Payment recorded successfully",
            Some(serde_json::to_value(&record).map_err(|e| AppError::internal(e.to_string()))?),
        ))
    }
}

// ========== GET_PAYMENT_HISTORY ==========

pub struct GetPaymentHistoryHandler {
    payments: Arc<PaymentProcessor>,
}

impl GetPaymentHistoryHandler {
    pub fn new(payments: Arc<PaymentProcessor>) -> Self {
        Self { payments }
    }
}

#[async_trait]
impl ActionHandler for GetPaymentHistoryHandler {
    fn action(&self) -> &'static str {
        "GET_PAYMENT_HISTORY"
    }

    async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload> {
        let bill_id = decode_id(params, "bill")?;
        let history = self.payments.payment_history(bill_id).await?;
        let message = if history.is_empty() {
            "No payments found".to_string()
        } else {
            format!("{} payment(s) found", history.len())
        };
        Ok(ResponsePayload::success(
            message,
            Some(serde_json::to_value(&history).map_err(|e| AppError::internal(e.to_string()))?),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_param_accepts_bare_and_keyed_forms() {
        assert_eq!(decode_id(Some(serde_json::json!(42)), "order").unwrap(), 42);
        assert_eq!(
            decode_id(Some(serde_json::json!({"order_id": 7})), "order").unwrap(),
            7
        );
        assert_eq!(
            decode_id(Some(serde_json::json!({"bill_id": 9})), "bill").unwrap(),
            9
        );
    }

    #[test]
    fn non_numeric_id_is_invalid_payload() {
        let err = decode_id(Some(serde_json::json!("forty-two")), "order").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PAYLOAD");
        let err = decode_id(None, "bill").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PAYLOAD");
    }
}
