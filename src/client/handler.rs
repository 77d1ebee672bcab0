//! Module `handler`
//!
//! Reads request lines (and upload payloads) from one connection, dispatches
//! them, and writes replies until the client quits or disconnects.

use log::{error, info, warn};
use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

use crate::config::ServerConfig;
use crate::protocol::responses::{self, format_response};
use crate::protocol::{Command, CommandResult, CommandStatus, handle_command, handle_upload, parse_command};
use crate::service::FileService;

/// Handles one RPC client session using the Tokio runtime.
///
/// - Uses a BufReader to read CRLF-terminated request lines, bounded by
///   `max_command_length`.
/// - Reads exactly the declared number of payload bytes after `UPLOAD`.
/// - Dispatches to the file service and writes the reply, followed by any
///   download content.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    service: FileService,
    config: Arc<ServerConfig>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();
    let max_line = config.server.max_command_length as u64;
    let limits = &config.limits;

    loop {
        line.clear();
        let n = match (&mut reader).take(max_line).read_until(b'\n', &mut line).await {
            Ok(n) => n,
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        };

        if n == 0 {
            info!("Connection closed by client {}", client_addr);
            break;
        }

        if !line.ends_with(b"\n") {
            if n as u64 >= max_line {
                warn!("Command from {} exceeds {} bytes", client_addr, max_line);
                let reply = format_response(responses::SYNTAX_ERROR, "Command too long");
                let _ = write_half.write_all(reply.as_bytes()).await;
            } else {
                info!("Client {} disconnected mid-command", client_addr);
            }
            break;
        }

        let text = String::from_utf8_lossy(&line);
        let is_utf8 = matches!(text, Cow::Borrowed(_));
        let command = parse_command(&text);
        info!("Received from {}: {:?}", client_addr, &command);

        if !is_utf8 && !matches!(command, Command::UPLOAD { .. }) {
            if write_half.write_all(not_utf8_reply().as_bytes()).await.is_err() {
                break;
            }
            continue;
        }

        let result = match command {
            Command::UPLOAD { size, filename } => {
                if size > limits.max_upload_bytes() {
                    warn!(
                        "Rejected upload of {} from {}: {} bytes exceeds {} bytes",
                        filename,
                        client_addr,
                        size,
                        limits.max_upload_bytes()
                    );
                    let reply = format_response(
                        responses::TOO_LARGE,
                        &format!("Upload exceeds {} bytes", limits.max_upload_bytes()),
                    );
                    let _ = write_half.write_all(reply.as_bytes()).await;
                    break;
                }

                let mut content = vec![0u8; size as usize];
                if let Err(e) = reader.read_exact(&mut content).await {
                    warn!(
                        "Client {} closed before sending {} payload bytes: {}",
                        client_addr, size, e
                    );
                    break;
                }

                if is_utf8 {
                    handle_upload(&service, limits, &filename, content).await
                } else {
                    warn!(
                        "Discarded {} byte upload from {}: name is not valid UTF-8",
                        size, client_addr
                    );
                    CommandResult {
                        status: CommandStatus::Failure("Command is not valid UTF-8".into()),
                        message: Some(not_utf8_reply()),
                        data: None,
                    }
                }
            }
            other => handle_command(&service, limits, &other).await,
        };

        let close = result.status == CommandStatus::CloseConnection;
        if let Err(e) = write_result(&mut write_half, result).await {
            error!("Failed to reply to {}: {}", client_addr, e);
            break;
        }

        if close {
            info!("Client {} requested to quit", client_addr);
            break;
        }
    }

    let _ = write_half.shutdown().await;
    info!("Client {} disconnected", client_addr);
}

fn not_utf8_reply() -> String {
    format_response(responses::BAD_ARGUMENTS, "Command is not valid UTF-8")
}

async fn write_result(
    write_half: &mut OwnedWriteHalf,
    result: CommandResult,
) -> std::io::Result<()> {
    if let Some(msg) = result.message {
        write_half.write_all(msg.as_bytes()).await?;
    }
    if let Some(data) = result.data {
        write_half.write_all(&data).await?;
    }
    write_half.flush().await
}
