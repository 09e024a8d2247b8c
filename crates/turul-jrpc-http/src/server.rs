//! HTTP JSON-RPC server
//!
//! Binds a TCP listener and serves one JSON-RPC endpoint over HTTP/1.1.

use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use turul_jrpc::{BatchEngine, MethodRegistry};

use crate::Result;
use crate::handler::RpcHttpHandler;

/// Configuration for the HTTP JSON-RPC server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Exact path of the JSON-RPC endpoint
    pub rpc_path: String,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            rpc_path: "/".to_string(),
            max_body_size: 1024 * 1024, // 1MB
            enable_cors: false,
        }
    }
}

/// Builder for [`HttpRpcServer`]
#[derive(Debug, Default)]
pub struct HttpRpcServerBuilder {
    config: ServerConfig,
    engine: Option<BatchEngine>,
}

impl HttpRpcServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Set the maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Serve `registry` through an engine with default settings
    pub fn registry(mut self, registry: MethodRegistry) -> Self {
        self.engine = Some(BatchEngine::new(registry));
        self
    }

    /// Serve through a preconfigured engine
    pub fn engine(mut self, engine: BatchEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Build the server. Without a registry every call answers
    /// "Method not found".
    pub fn build(self) -> HttpRpcServer {
        let engine = self
            .engine
            .unwrap_or_else(|| BatchEngine::new(MethodRegistry::default()));
        let config = Arc::new(self.config);

        HttpRpcServer {
            handler: RpcHttpHandler::new(Arc::clone(&config), engine),
            config,
        }
    }
}

/// HTTP JSON-RPC server
#[derive(Debug, Clone)]
pub struct HttpRpcServer {
    config: Arc<ServerConfig>,
    handler: RpcHttpHandler,
}

impl HttpRpcServer {
    pub fn builder() -> HttpRpcServerBuilder {
        HttpRpcServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn handler(&self) -> &RpcHttpHandler {
        &self.handler
    }

    /// Bind the configured address and serve forever
    pub async fn run(&self) -> Result<()> {
        self.run_until(CancellationToken::new()).await
    }

    /// Bind the configured address and serve until `shutdown` fires
    pub async fn run_until(&self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from an already bound listener until `shutdown` fires.
    /// Connections in flight are left to finish on their own tasks.
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        info!("HTTP JSON-RPC server listening on {}", listener.local_addr()?);
        info!("JSON-RPC endpoint available at: {}", self.config.rpc_path);
        info!(
            methods = self.handler.engine().registry().len(),
            "Registered methods"
        );

        loop {
            let (stream, peer_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = shutdown.cancelled() => {
                    info!("HTTP JSON-RPC server shutting down");
                    return Ok(());
                }
            };
            debug!("New connection from {}", peer_addr);

            let handler = self.handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() || err.is_canceled() {
                        debug!("Client disconnected: {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}
