//! Shared types for the café POS backend
//!
//! Everything in this crate crosses the wire between the server and its
//! clients: the request/response envelope, the domain model DTOs, and the
//! ID/time helpers both sides agree on.

pub mod message;
pub mod models;
pub mod util;

pub use message::{RequestPayload, ResponsePayload};
pub use models::{OrderStatus, PaymentMethod};
