//! CafeTime Server - 咖啡馆收银后端
//!
//! # 架构概述
//!
//! 单进程 TCP 服务，请求/响应为长度前缀的 JSON 信封：
//!
//! - **消息层** (`message`): 帧编解码、会话循环、动作注册表
//! - **领域服务** (`services`): 订单台账、计费引擎、支付处理器
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx)
//!
//! # 模块结构
//!
//! ```text
//! cafe-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── message/       # 帧编解码、会话、动作分发
//! ├── services/      # 订单、账单、支付
//! ├── db/            # 连接池、迁移、仓储
//! └── utils/         # 日志等工具
//! ```

pub mod core;
pub mod db;
pub mod message;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{AppError, AppResult, Config, Server, ServerState};
pub use crate::services::{BillingEngine, OrderLedger, PaymentProcessor};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: dotenv → 配置 → 工作目录 → 日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    // 生产环境输出 JSON 并落盘，开发环境只打控制台
    let log_dir = format!("{}/logs", config.work_dir);
    utils::init_logger_with_file(
        &config.log_level,
        config.is_production(),
        config.is_production().then_some(log_dir.as_str()),
    )?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ______      ____   ______
  / ____/___ _/ __/__/_  __(_)___ ___  ___
 / /   / __ `/ /_/ _ \/ / / / __ `__ \/ _ \
/ /___/ /_/ / __/  __/ / / / / / / / /  __/
\____/\__,_/_/  \___/_/ /_/_/ /_/ /_/\___/
    "#
    );
}
