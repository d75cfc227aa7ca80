use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::{AppResult, Config};
use crate::db::DbService;
use crate::message::ActionRegistry;
use crate::services::{BillingEngine, OrderLedger, PaymentProcessor};

/// 服务器状态 - 持有所有服务的单例引用
///
/// 启动时构造一次，随后以浅拷贝 (Arc) 的方式传给每个连接任务。
/// 所有可变持久状态都在数据库里；这里的服务本身是无状态的
/// (计费引擎的每订单锁表除外，它只做进程内串行化)。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | orders / billing / payments | 领域服务 |
/// | registry | 动作注册表 (启动后不可变) |
/// | shutdown | 全局停机信号 |
/// | sessions | 活跃连接表 (观测用) |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub orders: Arc<OrderLedger>,
    pub billing: Arc<BillingEngine>,
    pub payments: Arc<PaymentProcessor>,
    pub registry: Arc<ActionRegistry>,
    pub shutdown: CancellationToken,
    pub sessions: Arc<DashMap<Uuid, String>>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：工作目录 → 数据库 (连接池 + 迁移) → 领域服务 →
    /// 动作注册表。注册表在此之后不再变化。
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            crate::core::AppError::internal(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir
            ))
        })?;

        let db = DbService::new(&config.db_path).await?;
        let pool = db.pool.clone();

        let orders = Arc::new(OrderLedger::new(pool.clone()));
        let billing = Arc::new(BillingEngine::new(pool.clone()));
        let payments = Arc::new(PaymentProcessor::new(pool));

        let registry = Arc::new(ActionRegistry::with_default_handlers(
            orders.clone(),
            billing.clone(),
            payments.clone(),
        ));

        tracing::info!(
            actions = registry.len(),
            db_path = %config.db_path,
            "Server state initialized"
        );

        Ok(Self {
            config: config.clone(),
            db,
            orders,
            billing,
            payments,
            registry,
            shutdown: CancellationToken::new(),
            sessions: Arc::new(DashMap::new()),
        })
    }
}
