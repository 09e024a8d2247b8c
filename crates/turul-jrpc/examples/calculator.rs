//! Calculator JSON-RPC Example
//!
//! Registers a few arithmetic methods (plain, grouped and suppressed) and
//! feeds single, batch and notification payloads through the engine.
//!
//! ```text
//! RUST_LOG=turul_jrpc=debug cargo run -p turul-jrpc --example calculator
//! ```

use serde::Deserialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use turul_jrpc::prelude::*;

#[derive(Debug, Deserialize)]
struct Operands {
    a: f64,
    b: f64,
}

#[derive(Debug, Deserialize)]
struct AuditParams {
    message: String,
}

fn build_registry() -> Result<MethodRegistry, RegistryError> {
    let mut registry = MethodRegistry::builder();

    registry.method(
        "ping",
        handler_fn(|_ctx: RequestContext| async move { Ok::<_, RpcError>("pong") }),
    )?;

    {
        let mut calculator = registry.group("calculator");
        calculator
            .method(
                "add",
                handler_fn(|ctx: RequestContext| async move {
                    let Operands { a, b } = ctx.require_params()?;
                    Ok::<_, RpcError>(json!({ "result": a + b }))
                }),
            )?
            .method(
                "subtract",
                handler_fn(|ctx: RequestContext| async move {
                    let Operands { a, b } = ctx.require_params()?;
                    Ok::<_, RpcError>(json!({ "result": a - b }))
                }),
            )?
            .method(
                "divide",
                handler_fn(|ctx: RequestContext| async move {
                    let Operands { a, b } = ctx.require_params()?;
                    if b == 0.0 {
                        return Err(RpcError::custom(
                            -32000,
                            "Division by zero",
                            Some(json!({ "dividend": a })),
                        ));
                    }
                    Ok(json!({ "result": a / b }))
                }),
            )?;
    }

    registry.method_with_options(
        "audit",
        handler_fn(|ctx: RequestContext| async move {
            let params: AuditParams = ctx.require_params()?;
            info!(id = %ctx.id(), message = %params.message, "Audit entry");
            Ok::<_, RpcError>(())
        }),
        MethodOptions::suppressed(),
    )?;

    Ok(registry.build())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let engine = BatchEngine::new(build_registry()?);
    info!(methods = ?engine.registry().registered_methods(), "Calculator ready");

    let payloads = [
        r#"{"jsonrpc": "2.0", "method": "calculator.add", "params": {"a": 5, "b": 3}, "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "calculator.divide", "params": {"a": 1, "b": 0}, "id": "div"}"#,
        r#"[
            {"jsonrpc": "2.0", "method": "calculator.subtract", "params": {"a": 10, "b": 4}, "id": 2},
            {"jsonrpc": "2.0", "method": "ping", "id": 3},
            {"jsonrpc": "2.0", "method": "audit", "params": {"message": "batch seen"}, "id": 4},
            {"jsonrpc": "2.0", "method": "calculator.pow", "id": 5}
        ]"#,
        r#"{"jsonrpc": "2.0", "method": "ping"}"#,
    ];

    for payload in payloads {
        let response = engine.handle(payload.as_bytes()).await;
        if response.is_empty() {
            println!("--> (no response)");
        } else {
            println!("--> {}", String::from_utf8_lossy(&response));
        }
    }

    Ok(())
}
