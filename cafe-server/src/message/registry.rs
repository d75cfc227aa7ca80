//! Action Registry
//!
//! 动作名 → 处理器的映射。启动时构建一次，之后不可变；原实现里的
//! 中央 switch 分发被这里的注册表替代。领域错误在此边界统一转换为
//! 失败信封，绝不会作为协议层故障向上传播。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use shared::message::{RequestPayload, ResponsePayload};

use crate::core::AppResult;
use crate::services::{BillingEngine, OrderLedger, PaymentProcessor};

/// One named operation.
///
/// Handlers accept the raw JSON params and either produce a success envelope
/// or an [`crate::core::AppError`] that the registry converts for them.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// The action name this handler answers to.
    fn action(&self) -> &'static str;

    async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload>;
}

/// Immutable name → handler table.
pub struct ActionRegistry {
    handlers: HashMap<&'static str, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler (builder style; construction-time only).
    pub fn register(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        let action = handler.action();
        if self.handlers.insert(action, handler).is_some() {
            // 动作名必须唯一；注册发生在启动期，直接 panic 暴露配置错误
            panic!("Duplicate action handler registered: {action}");
        }
        self
    }

    /// Build the full production registry.
    pub fn with_default_handlers(
        orders: Arc<OrderLedger>,
        billing: Arc<BillingEngine>,
        payments: Arc<PaymentProcessor>,
    ) -> Self {
        use super::handlers::*;

        Self::new()
            .register(Arc::new(PingHandler))
            .register(Arc::new(CreateOrderHandler::new(orders.clone())))
            .register(Arc::new(GetOrderTotalHandler::new(orders)))
            .register(Arc::new(GenerateBillHandler::new(billing.clone())))
            .register(Arc::new(GetBillDetailsHandler::new(billing)))
            .register(Arc::new(MakePaymentHandler::new(payments.clone())))
            .register(Arc::new(GetPaymentHistoryHandler::new(payments)))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route one request to its handler and wrap the outcome in an envelope.
    ///
    /// Unknown actions and handler errors both come back as failure
    /// envelopes; the connection stays usable either way.
    pub async fn dispatch(&self, request: &RequestPayload) -> ResponsePayload {
        let Some(handler) = self.handlers.get(request.action.as_str()) else {
            tracing::debug!(action = %request.action, "Unknown action");
            return crate::core::AppError::InvalidAction.into_response();
        };

        match handler.handle(request.data.clone()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(action = %request.action, error = %e, "Action failed");
                e.into_response()
            }
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppError;

    struct EchoHandler;

    #[async_trait]
    impl ActionHandler for EchoHandler {
        fn action(&self) -> &'static str {
            "ECHO"
        }

        async fn handle(&self, params: Option<Value>) -> AppResult<ResponsePayload> {
            Ok(ResponsePayload::success("echo", params))
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl ActionHandler for FailingHandler {
        fn action(&self) -> &'static str {
            "FAIL"
        }

        async fn handle(&self, _params: Option<Value>) -> AppResult<ResponsePayload> {
            Err(AppError::NotFound("nothing here".into()))
        }
    }

    #[tokio::test]
    async fn dispatch_routes_to_registered_handler() {
        let registry = ActionRegistry::new().register(Arc::new(EchoHandler));
        let req = RequestPayload::new("ECHO", Some(serde_json::json!({"k": 1})));
        let resp = registry.dispatch(&req).await;
        assert!(resp.success);
        assert_eq!(resp.data, Some(serde_json::json!({"k": 1})));
    }

    #[tokio::test]
    async fn unknown_action_is_reported_not_fatal() {
        let registry = ActionRegistry::new().register(Arc::new(EchoHandler));
        let req = RequestPayload::new("NO_SUCH_ACTION", None);
        let resp = registry.dispatch(&req).await;
        assert!(!resp.success);
        assert_eq!(resp.message, "Invalid action");

        // 同一注册表随后仍可正常分发
        let ok = registry
            .dispatch(&RequestPayload::new("ECHO", None))
            .await;
        assert!(ok.success);
    }

    #[tokio::test]
    async fn handler_errors_become_failure_envelopes() {
        let registry = ActionRegistry::new().register(Arc::new(FailingHandler));
        let resp = registry.dispatch(&RequestPayload::new("FAIL", None)).await;
        assert!(!resp.success);
        assert_eq!(resp.error_code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    #[should_panic(expected = "Duplicate action handler")]
    fn duplicate_registration_panics_at_startup() {
        let _ = ActionRegistry::new()
            .register(Arc::new(EchoHandler))
            .register(Arc::new(EchoHandler));
    }
}
