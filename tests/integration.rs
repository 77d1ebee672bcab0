use std::collections::HashSet;
use std::future::pending;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use rax_file_server::admission::TrafficClass;
use rax_file_server::config::ServerConfig;
use rax_file_server::{FileService, Server};

// Minimal RPC client for the line-framed protocol
struct RpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RpcClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn send_line(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .unwrap();
    }

    async fn read_reply(&mut self) -> String {
        let mut reply = String::new();
        self.reader.read_line(&mut reply).await.unwrap();
        reply.trim_end_matches("\r\n").to_string()
    }

    async fn upload(&mut self, filename: &str, content: &[u8]) -> String {
        self.send_line(&format!("UPLOAD {} {}", content.len(), filename))
            .await;
        self.writer.write_all(content).await.unwrap();
        self.read_reply().await
    }

    async fn download(&mut self, filename: &str) -> Result<Vec<u8>, String> {
        self.send_line(&format!("DOWNLOAD {filename}")).await;
        let reply = self.read_reply().await;
        match reply.strip_prefix("150 ") {
            Some(len) => {
                let mut content = vec![0u8; len.parse().unwrap()];
                self.reader.read_exact(&mut content).await.unwrap();
                Ok(content)
            }
            None => Err(reply),
        }
    }

    /// Returns (created_at, updated_at, name) per entry
    async fn list(&mut self) -> Vec<(String, String, String)> {
        self.send_line("LIST").await;
        let reply = self.read_reply().await;
        let count: usize = reply
            .strip_prefix("212 ")
            .unwrap_or_else(|| panic!("unexpected LIST reply {reply:?}"))
            .parse()
            .unwrap();

        let mut entries = Vec::new();
        for _ in 0..count {
            let line = self.read_reply().await;
            let mut parts = line.splitn(3, '|');
            let created = parts.next().unwrap().to_string();
            let updated = parts.next().unwrap().to_string();
            let name = parts.next().unwrap().to_string();
            entries.push((created, updated, name));
        }
        entries
    }
}

async fn start_server(
    configure: impl FnOnce(&mut ServerConfig),
) -> (tempfile::TempDir, SocketAddr, FileService) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServerConfig::default();
    config.server.rpc_port = 0;
    config.server.web_enabled = false;
    config.server.storage_root = dir.path().to_string_lossy().to_string();
    configure(&mut config);

    let config = Arc::new(config);
    let service = FileService::from_config(&config.server, &config.limits);
    let server = Server::bind(Arc::clone(&config), service.clone())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.start());

    (dir, addr, service)
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let (_dir, addr, _service) = start_server(|_| {}).await;
    let mut client = RpcClient::connect(addr).await;

    let reply = client.upload("x.bin", &[0x01, 0x02, 0x03]).await;
    assert_eq!(reply, "226 File uploaded successfully");

    let entries = client.list().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].2, "x.bin");
    assert!(!entries[0].0.is_empty());
    assert_eq!(entries[0].0, entries[0].1);

    assert_eq!(client.download("x.bin").await.unwrap(), vec![0x01, 0x02, 0x03]);

    let err = client.download("y.bin").await.unwrap_err();
    assert!(err.starts_with("550 "), "{err}");
    assert!(err.contains("y.bin"));
}

#[tokio::test]
async fn test_overwrite_and_binary_round_trip() {
    let (_dir, addr, _service) = start_server(|_| {}).await;
    let mut client = RpcClient::connect(addr).await;

    // Payload containing CRLF and the reply delimiter must not confuse framing
    let binary: Vec<u8> = (0..=255u8).chain(b"\r\n226 fake\r\n".iter().copied()).collect();
    client.upload("a.txt", b"first").await;
    client.upload("a.txt", &binary).await;
    assert_eq!(client.download("a.txt").await.unwrap(), binary);

    client.upload("empty", b"").await;
    assert!(client.download("empty").await.unwrap().is_empty());

    let reply = client.upload("with space|and pipe", b"ok").await;
    assert!(reply.starts_with("226 "));
    let names: HashSet<String> = client.list().await.into_iter().map(|e| e.2).collect();
    assert_eq!(
        names,
        HashSet::from([
            "a.txt".to_string(),
            "empty".to_string(),
            "with space|and pipe".to_string()
        ])
    );
}

#[tokio::test]
async fn test_overloaded_transfer_budget() {
    let (dir, addr, service) = start_server(|config| {
        config.limits.max_transfer_ops = 1;
        config.limits.acquire_timeout_secs = 1;
    })
    .await;

    // Hold the only transfer slot, as a slow upload would
    let held = service
        .admission()
        .acquire(TrafficClass::Transfer, pending::<()>())
        .await
        .unwrap();

    let mut client = RpcClient::connect(addr).await;
    let reply = client.upload("second.txt", b"data").await;
    assert!(reply.starts_with("421 "), "{reply}");
    assert!(!dir.path().join("second.txt").exists());

    // Listing has its own budget
    assert!(client.list().await.is_empty());

    held.release();
    let reply = client.upload("second.txt", b"data").await;
    assert_eq!(reply, "226 File uploaded successfully");
}

#[tokio::test]
async fn test_blocked_upload_completes_after_release() {
    let (_dir, addr, service) = start_server(|config| {
        config.limits.max_transfer_ops = 1;
        config.limits.acquire_timeout_secs = 10;
    })
    .await;

    let held = service
        .admission()
        .acquire(TrafficClass::Transfer, pending::<()>())
        .await
        .unwrap();

    let pending_upload = tokio::spawn(async move {
        let mut client = RpcClient::connect(addr).await;
        client.upload("queued.bin", b"queued").await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!pending_upload.is_finished());

    held.release();
    let reply = tokio::time::timeout(Duration::from_secs(5), pending_upload)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply, "226 File uploaded successfully");
    assert_eq!(service.admission().in_use(TrafficClass::Transfer), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_refused() {
    let (dir, addr, _service) = start_server(|config| {
        config.limits.max_upload_size_mb = 1;
    })
    .await;
    let mut client = RpcClient::connect(addr).await;

    client
        .send_line(&format!("UPLOAD {} big.bin", 2 * 1024 * 1024))
        .await;
    let reply = client.read_reply().await;
    assert!(reply.starts_with("552 "), "{reply}");
    assert!(!dir.path().join("big.bin").exists());
}

#[tokio::test]
async fn test_protocol_errors() {
    let (_dir, addr, _service) = start_server(|config| {
        config.server.max_command_length = 64;
    })
    .await;
    let mut client = RpcClient::connect(addr).await;

    client.send_line("NOOP").await;
    assert_eq!(client.read_reply().await, "200 OK");

    client.send_line("RETR a.txt").await;
    assert_eq!(client.read_reply().await, "500 Unknown command");

    client.send_line("UPLOAD abc a.txt").await;
    assert!(client.read_reply().await.starts_with("501 "));

    let reply = client.upload("../escape.txt", b"x").await;
    assert!(reply.starts_with("451 "), "{reply}");

    client.send_line("QUIT").await;
    assert_eq!(client.read_reply().await, "221 Goodbye");

    // Exactly max_command_length bytes with no line terminator
    let mut client = RpcClient::connect(addr).await;
    let long_line = format!("DOWNLOAD {}", "a".repeat(55));
    assert_eq!(long_line.len(), 64);
    client.writer.write_all(long_line.as_bytes()).await.unwrap();
    assert_eq!(client.read_reply().await, "500 Command too long");
}

#[tokio::test]
async fn test_rejected_upload_payload_is_not_run_as_commands() {
    let (_dir, addr, _service) = start_server(|_| {}).await;
    let mut client = RpcClient::connect(addr).await;

    // Missing filename: the payload looks like a command but must be consumed
    client.send_line("UPLOAD 6 ").await;
    client.writer.write_all(b"NOOP\r\n").await.unwrap();
    let reply = client.read_reply().await;
    assert!(reply.starts_with("501 "), "{reply}");

    // Non UTF-8 filename: same, the payload would otherwise end the session
    client.writer.write_all(b"UPLOAD 6 \xff.bin\r\nQUIT\r\n").await.unwrap();
    let reply = client.read_reply().await;
    assert_eq!(reply, "501 Command is not valid UTF-8");

    // The session is still in sync and nothing was stored
    client.send_line("NOOP").await;
    assert_eq!(client.read_reply().await, "200 OK");
    assert!(client.list().await.is_empty());
}

#[tokio::test]
async fn test_many_clients_respect_transfer_limit() {
    let (_dir, addr, service) = start_server(|config| {
        config.limits.max_transfer_ops = 2;
    })
    .await;

    let mut tasks = Vec::new();
    for i in 0..12 {
        tasks.push(tokio::spawn(async move {
            let mut client = RpcClient::connect(addr).await;
            let content = vec![i as u8; 256 * 1024];
            let name = format!("file-{i}.bin");
            assert!(client.upload(&name, &content).await.starts_with("226 "));
            assert_eq!(client.download(&name).await.unwrap(), content);
        }));
    }

    let observer = {
        let service = service.clone();
        tokio::spawn(async move {
            let mut peak = 0;
            for _ in 0..200 {
                peak = peak.max(service.admission().in_use(TrafficClass::Transfer));
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            peak
        })
    };

    for task in tasks {
        task.await.unwrap();
    }
    assert!(observer.await.unwrap() <= 2);

    let mut client = RpcClient::connect(addr).await;
    assert_eq!(client.list().await.len(), 12);
}
