//! 消息层
//!
//! 字节流 → 帧 → 信封 → 处理器的整条路径：
//!
//! ```text
//!  TcpStream ──► codec (长度前缀帧) ──► session (顺序处理循环)
//!                                        │
//!                                        ▼
//!                               registry (动作分发)
//!                                        │
//!                                        ▼
//!                               handlers (参数解码 → 领域服务)
//! ```

pub mod codec;
pub mod handlers;
pub mod registry;
pub mod session;

pub use registry::{ActionHandler, ActionRegistry};
