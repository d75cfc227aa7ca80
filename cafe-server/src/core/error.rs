//! 统一错误处理
//!
//! 应用级错误枚举与响应信封的转换。只有协议/传输层错误
//! ([`AppError::Framing`]) 会终止连接；领域错误一律转换为失败信封，
//! 连接保持可用。
//!
//! # 错误码
//!
//! | 错误码 | 分类 | 连接 |
//! |--------|------|------|
//! | FRAMING | 协议错误 | 断开 |
//! | INVALID_ACTION / INVALID_PAYLOAD | 请求错误 | 保持 |
//! | NOT_FOUND / INVALID_STATE / ALREADY_BILLED / INVALID_ITEM | 领域错误 | 保持 |
//! | INVALID_DISCOUNT / INVALID_AMOUNT / UNKNOWN_PAYMENT_METHOD | 领域错误 | 保持 |
//! | DATABASE / INTERNAL | 系统错误 | 保持 |

use crate::db::repository::RepoError;
use shared::message::ResponsePayload;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 协议错误 (连接致命) ==========
    #[error("Framing error: {0}")]
    Framing(String),

    // ========== 请求错误 ==========
    #[error("Invalid action")]
    InvalidAction,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    // ========== 领域错误 ==========
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Bill already exists for order {0}")]
    AlreadyBilled(i64),

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    // ========== 系统错误 ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn framing(msg: impl Into<String>) -> Self {
        Self::Framing(msg.into())
    }

    /// Only framing/transport faults tear the connection down.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, Self::Framing(_))
    }

    /// Stable machine-readable code carried in the response envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Framing(_) => "FRAMING",
            Self::InvalidAction => "INVALID_ACTION",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::AlreadyBilled(_) => "ALREADY_BILLED",
            Self::InvalidItem(_) => "INVALID_ITEM",
            Self::InvalidDiscount(_) => "INVALID_DISCOUNT",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::UnknownPaymentMethod(_) => "UNKNOWN_PAYMENT_METHOD",
            Self::Database(_) => "DATABASE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Convert into the failure envelope reported to the client.
    ///
    /// System errors are logged in full here; the client only sees a short
    /// diagnostic, never raw storage detail.
    pub fn into_response(self) -> ResponsePayload {
        let message = match &self {
            Self::InvalidAction => "Invalid action".to_string(),
            Self::Database(detail) => {
                tracing::error!(target: "database", error = %detail, "Database error occurred");
                "Database error".to_string()
            }
            Self::Internal(detail) => {
                tracing::error!(target: "internal", error = %detail, "Internal error occurred");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        ResponsePayload::error(message, Some(self.error_code().to_string()))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            // 重复键在具体调用点另行映射 (如 AlreadyBilled)；兜底按数据库错误处理
            RepoError::Duplicate(msg) => AppError::Database(format!("Unexpected duplicate: {msg}")),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}
