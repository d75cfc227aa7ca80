//! Core: 配置、状态、错误、服务器生命周期

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::Server;
pub use state::ServerState;
