use cafe_server::{print_banner, setup_environment, Server, ServerState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 工作目录, 日志)
    let config = setup_environment()?;

    // 打印横幅
    print_banner();

    tracing::info!("☕ CafeTime Server starting...");

    // 2. 初始化服务器状态 (数据库 + 领域服务 + 注册表)
    let state = ServerState::initialize(&config).await?;

    // 3. 启动 TCP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
