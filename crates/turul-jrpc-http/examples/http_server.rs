//! Minimal JSON-RPC HTTP server
//!
//! ```text
//! cargo run -p turul-jrpc-http --example http_server
//! curl -s localhost:8080/rpc -d '{"jsonrpc":"2.0","method":"echo","params":["hi"],"id":1}'
//! ```

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use turul_jrpc::prelude::*;
use turul_jrpc_http::HttpRpcServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut registry = MethodRegistry::builder();
    registry.method(
        "echo",
        handler_fn(|ctx: RequestContext| async move {
            Ok::<_, RpcError>(ctx.params_to::<Value>()?.unwrap_or(Value::Null))
        }),
    )?;

    let server = HttpRpcServer::builder()
        .rpc_path("/rpc")
        .cors(true)
        .registry(registry.build())
        .build();

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received");
                shutdown.cancel();
            }
        });
    }

    server.run_until(shutdown).await?;
    Ok(())
}
