//! Demo client for the RPC gateway
//!
//! Uploads a local file, prints the listing, then downloads the file back
//! as `downloaded_<name>`.
//!
//! Usage: `rax-client <file> [addr]` (addr defaults to `127.0.0.1:50051`)

use log::{error, info};
use std::io;
use std::path::Path;
use std::process::exit;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use rax_file_server::utils::logging::setup_logging;

const DEFAULT_ADDR: &str = "127.0.0.1:50051";

struct Session {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Session {
    async fn connect(addr: &str) -> io::Result<Self> {
        let (read_half, writer) = TcpStream::connect(addr).await?.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
        })
    }

    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(format!("{line}\r\n").as_bytes()).await
    }

    async fn read_reply(&mut self) -> io::Result<String> {
        let mut reply = String::new();
        if self.reader.read_line(&mut reply).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(reply.trim_end_matches("\r\n").to_string())
    }

    async fn upload(&mut self, name: &str, content: &[u8]) -> io::Result<String> {
        self.send_line(&format!("UPLOAD {} {}", content.len(), name))
            .await?;
        self.writer.write_all(content).await?;
        let reply = self.read_reply().await?;
        expect_code("226", &reply)
    }

    async fn list(&mut self) -> io::Result<Vec<String>> {
        self.send_line("LIST").await?;
        let reply = self.read_reply().await?;
        let count: usize = expect_code("212", &reply)?
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.read_reply().await?);
        }
        Ok(lines)
    }

    async fn download(&mut self, name: &str) -> io::Result<Vec<u8>> {
        self.send_line(&format!("DOWNLOAD {name}")).await?;
        let reply = self.read_reply().await?;
        let len: usize = expect_code("150", &reply)?
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut content = vec![0u8; len];
        self.reader.read_exact(&mut content).await?;
        Ok(content)
    }

    async fn quit(&mut self) -> io::Result<()> {
        self.send_line("QUIT").await?;
        self.read_reply().await.map(|_| ())
    }
}

/// Fails unless `reply` carries `code`; returns the text after it.
fn expect_code(code: &str, reply: &str) -> io::Result<String> {
    match reply.strip_prefix(code).and_then(|rest| rest.strip_prefix(' ')) {
        Some(rest) => Ok(rest.to_string()),
        None => Err(io::Error::other(format!("server replied {reply:?}"))),
    }
}

async fn run(path: &Path, addr: &str) -> io::Result<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string();
    let content = tokio::fs::read(path).await?;

    let mut session = Session::connect(addr).await?;
    info!("Connected to {}", addr);

    println!("{}", session.upload(&name, &content).await?);

    for line in session.list().await? {
        let mut parts = line.splitn(3, '|');
        let created = parts.next().unwrap_or_default();
        let _updated = parts.next();
        let file = parts.next().unwrap_or_default();
        println!("Name: {}, Created at: {}", file, created);
    }

    let downloaded = session.download(&name).await?;
    let target = format!("downloaded_{name}");
    tokio::fs::write(&target, &downloaded).await?;
    println!("File downloaded successfully to {}", target);

    session.quit().await
}

#[tokio::main]
async fn main() {
    setup_logging();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: rax-client <file> [addr]");
        exit(2);
    };
    let addr = args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string());

    if let Err(e) = run(Path::new(&path), &addr).await {
        error!("Client failed: {}", e);
        exit(1);
    }
}
