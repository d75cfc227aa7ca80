//! Server Implementation
//!
//! TCP 服务器启动和连接管理：监听端口、每连接一个任务、
//! ctrl-c 触发全局停机。

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

use crate::core::{AppError, AppResult, Config, ServerState};
use crate::message::session;

/// TCP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// Create server with existing state (for sharing with tests)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// Bind the listener without starting the accept loop.
    ///
    /// Tests bind port 0 and read the actual address off the listener.
    pub async fn bind(&self) -> AppResult<TcpListener> {
        let addr = format!("0.0.0.0:{}", self.config.tcp_port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        Ok(listener)
    }

    pub async fn run(self) -> AppResult<()> {
        let listener = self.bind().await?;
        tracing::info!("Cafe server listening on {}", listener.local_addr().map_err(|e| AppError::internal(e.to_string()))?);

        // ctrl-c 触发停机信号
        let shutdown = self.state.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down...");
                shutdown.cancel();
            }
        });

        Self::serve(self.state, listener).await
    }

    /// Main accept loop
    pub async fn serve(state: ServerState, listener: TcpListener) -> AppResult<()> {
        loop {
            tokio::select! {
                _ = state.shutdown.cancelled() => {
                    tracing::info!("Server shutting down, draining {} session(s)", state.sessions.len());
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::debug!("Client connected: {}", addr);
                            spawn_session(&state, stream, addr);
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Spawn a new task to handle a client connection
fn spawn_session(state: &ServerState, stream: TcpStream, addr: SocketAddr) {
    let session_id = Uuid::new_v4();
    state.sessions.insert(session_id, addr.to_string());

    let registry = state.registry.clone();
    let sessions = state.sessions.clone();
    let shutdown = state.shutdown.clone();
    let read_timeout = state.config.read_timeout();

    tokio::spawn(async move {
        session::run(stream, addr, registry, read_timeout, shutdown).await;
        sessions.remove(&session_id);
        tracing::debug!(session_id = %session_id, "Session removed from registry");
    });
}
