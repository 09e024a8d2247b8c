//! End-to-end tests over a real TCP socket

use std::time::Duration;

use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use turul_jrpc::prelude::*;

use crate::server::{HttpRpcServer, ServerConfig};

fn registry() -> MethodRegistry {
    let mut builder = MethodRegistry::builder();
    builder
        .group("math")
        .method(
            "sum",
            handler_fn(|ctx: RequestContext| async move {
                let values: Vec<i64> = ctx.require_params()?;
                Ok::<_, RpcError>(values.iter().sum::<i64>())
            }),
        )
        .unwrap();
    builder.build()
}

async fn post(addr: std::net::SocketAddr, path: &str, body: &str) -> (StatusCode, Bytes) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
    tokio::spawn(conn);

    let request = Request::post(path)
        .header("host", addr.to_string())
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap();

    let response = sender.send_request(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[test]
fn test_default_config() {
    let config = ServerConfig::default();
    assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
    assert_eq!(config.rpc_path, "/");
    assert_eq!(config.max_body_size, 1024 * 1024);
    assert!(!config.enable_cors);
}

#[test]
fn test_builder_overrides() {
    let server = HttpRpcServer::builder()
        .bind_address("0.0.0.0:9000".parse().unwrap())
        .rpc_path("/rpc")
        .max_body_size(2048)
        .cors(true)
        .registry(registry())
        .build();

    let config = server.config();
    assert_eq!(config.bind_address.port(), 9000);
    assert_eq!(config.rpc_path, "/rpc");
    assert_eq!(config.max_body_size, 2048);
    assert!(config.enable_cors);
    assert!(server.handler().engine().registry().contains("math.sum"));
}

#[tokio::test]
async fn test_serve_answers_requests_until_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let server = HttpRpcServer::builder()
        .rpc_path("/rpc")
        .registry(registry())
        .build();
    let serving = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { server.serve(listener, shutdown).await })
    };

    let (status, body) = post(
        addr,
        "/rpc",
        r#"{"jsonrpc": "2.0", "method": "math.sum", "params": [1, 2, 4], "id": "s"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({"jsonrpc": "2.0", "result": 7, "id": "s"}));

    let (status, _) = post(addr, "/elsewhere", "{}").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_server_without_registry_reports_method_not_found() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let server = HttpRpcServer::builder().build();
    let serving = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { server.serve(listener, shutdown).await })
    };

    let (status, body) = post(addr, "/", r#"{"jsonrpc": "2.0", "method": "x", "id": 1}"#).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"]["code"], json!(-32601));

    shutdown.cancel();
    serving.await.unwrap().unwrap();
}
