use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::admission::TrafficClass;
use crate::client::handle_client;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::service::FileService;
use crate::storage::ensure_root;
use crate::web;

/// RPC gateway: accepts connections and runs one session task per client.
pub struct Server {
    listener: TcpListener,
    service: FileService,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the RPC socket from `config.server`.
    pub async fn bind(config: Arc<ServerConfig>, service: FileService) -> Result<Self, ServerError> {
        let addr = config.server.rpc_socket();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind { addr: addr.clone(), source: e })?;
        info!("Server bound to {}", addr);

        Ok(Self {
            listener,
            service,
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop forever.
    pub async fn start(self) {
        info!(
            "Starting RAX file server (transfer limit {}, list limit {})",
            self.config.limits.max_transfer_ops, self.config.limits.max_list_ops
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("New connection: {}", addr);
                    let service = self.service.clone();
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_client(stream, addr, service, config).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Bootstraps storage, builds the shared file service, and serves the RPC
/// gateway (and the browser gateway when enabled) until ctrl-c.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let root = config.server.storage_root_path();
    ensure_root(&root).map_err(|e| ServerError::StorageRoot { root: root.clone(), source: e })?;

    let config = Arc::new(config);
    let service = FileService::from_config(&config.server, &config.limits);
    info!(
        "Admission budgets: {} transfer, {} list",
        service.admission().budget(TrafficClass::Transfer).capacity(),
        service.admission().budget(TrafficClass::Listing).capacity()
    );
    let server = Server::bind(Arc::clone(&config), service.clone()).await?;

    let web_listener = if config.server.web_enabled {
        let addr = config.server.web_socket();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind { addr: addr.clone(), source: e })?;
        info!("Web gateway bound to {}", addr);
        Some(listener)
    } else {
        info!("Web gateway disabled");
        None
    };

    let web_task = async {
        match web_listener {
            Some(listener) => web::serve(listener, service.clone(), config.limits.clone()).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = server.start() => Ok(()),
        result = web_task => result.map_err(ServerError::from),
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => warn!("Received ctrl-c, shutting down"),
                Err(e) => error!("Failed to listen for ctrl-c: {}", e),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn quit_is_acknowledged() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.server.rpc_port = 0;
        config.server.storage_root = dir.path().to_string_lossy().to_string();
        let config = Arc::new(config);

        let service = FileService::from_config(&config.server, &config.limits);
        let server = Server::bind(config, service).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.start());

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        write_half.write_all(b"QUIT\r\n").await.unwrap();

        let mut reader = BufReader::new(read_half);
        let mut response = String::new();
        reader.read_line(&mut response).await.unwrap();
        assert_eq!(response, "221 Goodbye\r\n");
    }
}
