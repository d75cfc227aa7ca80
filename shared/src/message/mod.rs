//! 请求/响应信封类型
//!
//! 服务端与客户端共享的消息信封。每个逻辑消息都是一个 JSON 编码的
//! 信封，由传输层的长度前缀帧承载（见 cafe-server 的 codec 模块）。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// 请求信封 (客户端 -> 服务端)
///
/// 每个请求携带一个操作标识和可选的参数对象。信封本身无状态，
/// 不携带消息级别的标识。
///
/// # 示例
/// - `action`: "CREATE_ORDER"
/// - `data`: `{ "order_type": "DineIn", "employee_id": 7, "items": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    /// 操作标识 (例如: "GENERATE_BILL", "MAKE_PAYMENT")
    pub action: String,
    /// 操作参数 (可选的 JSON 值)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RequestPayload {
    pub fn new(action: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            action: action.into(),
            data,
        }
    }

    /// 解析参数为指定类型
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone().unwrap_or(serde_json::Value::Null))
    }
}

/// 通用响应信封 (服务端 -> 客户端)
///
/// 每个请求恰好产生一个响应，按请求到达顺序返回。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// 是否成功
    pub success: bool,
    /// 响应消息/错误描述
    pub message: String,
    /// 响应数据 (可选)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// 错误代码 (可选, 仅在失败时有用)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ResponsePayload {
    pub fn success(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error_code: None,
        }
    }

    pub fn error(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error_code: code,
        }
    }

    /// 解析响应数据为指定类型
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone().unwrap_or(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_round_trip() {
        let req = RequestPayload::new(
            "GET_ORDER_TOTAL",
            Some(serde_json::json!({ "order_id": 42 })),
        );
        let bytes = serde_json::to_vec(&req).unwrap();
        let back: RequestPayload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_request_without_data() {
        let req: RequestPayload = serde_json::from_str(r#"{"action":"PING"}"#).unwrap();
        assert_eq!(req.action, "PING");
        assert!(req.data.is_none());
    }

    #[test]
    fn test_response_error_shape() {
        let resp = ResponsePayload::error("Invalid action", Some("INVALID_ACTION".into()));
        assert!(!resp.success);
        assert_eq!(resp.error_code.as_deref(), Some("INVALID_ACTION"));
        // data 字段缺省时不序列化
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("\"data\""));
    }
}
