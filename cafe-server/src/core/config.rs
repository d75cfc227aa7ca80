/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/cafetime | 工作目录 (数据库、日志) |
/// | TCP_PORT | 5000 | TCP 监听端口 |
/// | DB_PATH | <WORK_DIR>/cafetime.db | SQLite 数据库路径 |
/// | READ_TIMEOUT_MS | 300000 | 连接空闲读超时 (毫秒, 0 = 不限) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/cafetime TCP_PORT=5050 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// TCP 监听端口
    pub tcp_port: u16,
    /// SQLite 数据库路径
    pub db_path: String,
    /// 空闲连接读超时 (毫秒)，0 表示禁用
    pub read_timeout_ms: u64,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/cafetime".into());
        let db_path =
            std::env::var("DB_PATH").unwrap_or_else(|_| format!("{work_dir}/cafetime.db"));
        Self {
            work_dir,
            db_path,
            tcp_port: std::env::var("TCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            read_timeout_ms: std::env::var("READ_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300_000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, db_path: impl Into<String>, tcp_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.db_path = db_path.into();
        config.tcp_port = tcp_port;
        config
    }

    /// 空闲读超时；None 表示不限
    pub fn read_timeout(&self) -> Option<std::time::Duration> {
        (self.read_timeout_ms > 0).then(|| std::time::Duration::from_millis(self.read_timeout_ms))
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
