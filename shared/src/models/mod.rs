//! Domain model DTOs shared across the wire.

pub mod bill;
pub mod order;
pub mod payment;

pub use bill::{BillDetails, BillSummary, GenerateBillRequest};
pub use order::{CreateOrderRequest, OrderItemInput, OrderStatus, OrderSummary};
pub use payment::{MakePaymentRequest, PaymentMethod, PaymentRecord};
