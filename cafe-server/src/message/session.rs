//! Connection Session
//!
//! 每个已接受的 socket 对应一个会话任务，独占该连接直到结束。
//! 循环：读一帧请求 → 经注册表分发 → 写一帧响应。单连接内严格按
//! 到达顺序处理，响应顺序与请求顺序一致；不同连接之间没有顺序关系。
//!
//! 终止条件：
//! - 干净的 EOF（客户端正常断开），静默结束；
//! - 帧错误或 I/O 错误，结束且不重试；
//! - 空闲读超时（可配置），结束；
//! - 全局停机信号。
//!
//! 分发是内联 await 的，所以会话结束前进行中的持久化操作总是先
//! 提交或回滚完毕，之后才释放 socket。

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use shared::message::RequestPayload;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use super::codec;
use super::registry::ActionRegistry;
use crate::core::AppError;

/// Drive one client connection to completion.
pub async fn run(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<ActionRegistry>,
    read_timeout: Option<Duration>,
    shutdown: CancellationToken,
) {
    let (mut reader, mut writer) = stream.into_split();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Session {} closing: server shutdown", addr);
                break;
            }

            read_result = next_request(&mut reader, read_timeout) => {
                match read_result {
                    Ok(IdleTimeout) => {
                        tracing::info!("Session {} idle past read timeout, closing", addr);
                        break;
                    }
                    Ok(Request(request)) => {
                        let response = registry.dispatch(&request).await;
                        if let Err(e) = codec::write_message(&mut writer, &response).await {
                            tracing::debug!("Session {} write failed: {}", addr, e);
                            break;
                        }
                    }
                    Ok(Eof) => {
                        tracing::debug!("Session {} closed by client", addr);
                        break;
                    }
                    Err(e) if e.is_connection_fatal() => {
                        tracing::warn!("Session {} framing error: {}", addr, e);
                        // 已分发请求的响应都已写出并 flush；这里尽力再告知
                        // 客户端一次，然后断开
                        let farewell = e.into_response();
                        let _ = codec::write_message(&mut writer, &farewell).await;
                        break;
                    }
                    Err(e) => {
                        tracing::debug!("Session {} read error: {}", addr, e);
                        break;
                    }
                }
            }
        }
    }

    let _ = writer.shutdown().await;
    tracing::debug!("Session {} released", addr);
}

/// Outcome of waiting for the next frame.
enum ReadOutcome {
    Request(RequestPayload),
    /// Clean end-of-stream at a frame boundary.
    Eof,
    /// No bytes arrived within the configured idle window.
    IdleTimeout,
}

use ReadOutcome::{Eof, IdleTimeout, Request};

/// Read the next framed request, applying the idle timeout when configured.
async fn next_request<R>(
    reader: &mut R,
    read_timeout: Option<Duration>,
) -> Result<ReadOutcome, AppError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let read = codec::read_message(reader);
    let result = match read_timeout {
        None => read.await,
        Some(limit) => match tokio::time::timeout(limit, read).await {
            Ok(result) => result,
            Err(_elapsed) => return Ok(IdleTimeout),
        },
    };
    Ok(match result? {
        Some(request) => Request(request),
        None => Eof,
    })
}
