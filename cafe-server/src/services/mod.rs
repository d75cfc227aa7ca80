//! 领域服务
//!
//! 订单台账、计费引擎、支付处理器。三者共享同一个连接池，
//! 各自独占自己那张表的写入权：订单行项目只由台账写，账单只由
//! 计费引擎写，支付记录只由支付处理器写。

pub mod billing;
pub mod money;
pub mod orders;
pub mod payments;

pub use billing::BillingEngine;
pub use orders::OrderLedger;
pub use payments::PaymentProcessor;
