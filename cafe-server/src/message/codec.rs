//! 帧编解码
//!
//! TCP 只保证字节流，不保证消息边界：一次 read 可能带回半条消息，
//! 也可能带回两条。因此每条逻辑消息都带显式长度前缀：
//!
//! ```text
//! [u32 LE: JSON 长度][JSON 信封字节]
//! ```
//!
//! 读路径永远不产出半条消息，也不会把两条消息并成一条。长度字段
//! 非法 (0 或超过 [`MAX_FRAME_LEN`])、帧中途断流、或帧体不是合法
//! JSON，都是 `Framing` 错误并终止连接。帧边界上的干净 EOF 返回
//! `Ok(None)`。写路径对称。

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::{AppError, AppResult};

/// 单帧最大长度 (1 MiB)
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

const LEN_PREFIX: usize = 4;

/// Read the next framed message, or `None` on clean end-of-stream.
pub async fn read_message<R, T>(reader: &mut R) -> AppResult<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; LEN_PREFIX];
    if !fill_or_eof(reader, &mut len_buf).await? {
        return Ok(None);
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(AppError::framing(format!(
            "Frame length {len} outside 1..={MAX_FRAME_LEN}"
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            AppError::framing(format!("Stream closed mid-frame ({len} byte payload)"))
        } else {
            AppError::framing(format!("Read payload failed: {e}"))
        }
    })?;

    let msg = serde_json::from_slice(&payload)
        .map_err(|e| AppError::framing(format!("Malformed frame payload: {e}")))?;
    Ok(Some(msg))
}

/// Frame and write one message, flushing before returning.
pub async fn write_message<W, T>(writer: &mut W, msg: &T) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(msg)
        .map_err(|e| AppError::internal(format!("Failed to serialize message: {e}")))?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(AppError::internal(format!(
            "Response of {} bytes exceeds frame limit",
            payload.len()
        )));
    }

    let mut data = Vec::with_capacity(LEN_PREFIX + payload.len());
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&payload);

    writer
        .write_all(&data)
        .await
        .map_err(|e| AppError::framing(format!("Write failed: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| AppError::framing(format!("Flush failed: {e}")))?;
    Ok(())
}

/// Fill `buf` completely. `Ok(false)` means the stream ended cleanly before
/// the first byte; ending anywhere inside the prefix is a framing fault.
async fn fill_or_eof<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> AppResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read(&mut buf[filled..])
            .await
            .map_err(|e| AppError::framing(format!("Read length failed: {e}")))?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(AppError::framing("Stream closed mid-length-prefix".to_string()));
        }
        filled += n;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::RequestPayload;

    fn request(i: usize) -> RequestPayload {
        RequestPayload::new(
            "GET_ORDER_TOTAL",
            Some(serde_json::json!({ "order_id": i })),
        )
    }

    async fn encode_all(msgs: &[RequestPayload]) -> Vec<u8> {
        let mut buf = Vec::new();
        for msg in msgs {
            write_message(&mut buf, msg).await.unwrap();
        }
        buf
    }

    /// encode(N) → decode 必须恢复出 N 条原始消息，顺序不变
    async fn assert_round_trip(n: usize, chunk: usize) {
        let msgs: Vec<_> = (0..n).map(request).collect();
        let bytes = encode_all(&msgs).await;

        // 用人为的小块写入模拟传输层任意切分
        let (client, server) = tokio::io::duplex(64);
        let (mut read_half, _keep) = tokio::io::split(server);
        let (_discard, mut write_half) = tokio::io::split(client);

        let writer = tokio::spawn(async move {
            for piece in bytes.chunks(chunk) {
                write_half.write_all(piece).await.unwrap();
                write_half.flush().await.unwrap();
            }
            write_half.shutdown().await.unwrap();
        });

        let mut decoded = Vec::new();
        while let Some(msg) = read_message::<_, RequestPayload>(&mut read_half)
            .await
            .unwrap()
        {
            decoded.push(msg);
        }
        writer.await.unwrap();

        assert_eq!(decoded, msgs);
    }

    #[tokio::test]
    async fn round_trip_single_message() {
        assert_round_trip(1, 3).await;
    }

    #[tokio::test]
    async fn round_trip_ten_messages_chunked() {
        assert_round_trip(10, 7).await;
    }

    #[tokio::test]
    async fn round_trip_thousand_messages() {
        assert_round_trip(1000, 61).await;
    }

    #[tokio::test]
    async fn two_messages_in_one_write_are_not_merged() {
        let msgs = vec![request(1), request(2)];
        let bytes = encode_all(&msgs).await;
        let mut cursor = bytes.as_slice();

        let first: RequestPayload = read_message(&mut cursor).await.unwrap().unwrap();
        let second: RequestPayload = read_message(&mut cursor).await.unwrap().unwrap();
        assert_eq!(first, msgs[0]);
        assert_eq!(second, msgs[1]);
        assert!(read_message::<_, RequestPayload>(&mut cursor)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn oversize_length_is_framing_error() {
        let mut bytes = ((MAX_FRAME_LEN + 1) as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let mut cursor = bytes.as_slice();
        let err = read_message::<_, RequestPayload>(&mut cursor)
            .await
            .unwrap_err();
        assert!(err.is_connection_fatal());
    }

    #[tokio::test]
    async fn truncated_payload_is_framing_error() {
        let mut bytes = Vec::new();
        write_message(&mut bytes, &request(1)).await.unwrap();
        bytes.truncate(bytes.len() - 5);
        let mut cursor = bytes.as_slice();
        let err = read_message::<_, RequestPayload>(&mut cursor)
            .await
            .unwrap_err();
        assert!(err.is_connection_fatal());
    }

    #[tokio::test]
    async fn truncated_length_prefix_is_framing_error() {
        let bytes = [5u8, 0];
        let mut cursor = bytes.as_slice();
        let err = read_message::<_, RequestPayload>(&mut cursor)
            .await
            .unwrap_err();
        assert!(err.is_connection_fatal());
    }

    #[tokio::test]
    async fn non_json_payload_is_framing_error() {
        let mut bytes = (4u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(b"\xff\xfe\x00\x01");
        let mut cursor = bytes.as_slice();
        let err = read_message::<_, RequestPayload>(&mut cursor)
            .await
            .unwrap_err();
        assert!(err.is_connection_fatal());
    }

    #[tokio::test]
    async fn clean_eof_yields_none() {
        let bytes: Vec<u8> = Vec::new();
        let mut cursor = bytes.as_slice();
        assert!(read_message::<_, RequestPayload>(&mut cursor)
            .await
            .unwrap()
            .is_none());
    }
}
