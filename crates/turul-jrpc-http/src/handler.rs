//! Request handling for the JSON-RPC HTTP endpoint
//!
//! Every request for the configured path is a POST whose body is handed to
//! the [`BatchEngine`] untouched. Whatever bytes the engine renders become the
//! response body; an empty rendering becomes `204 No Content`.

use std::error::Error as StdError;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full, Limited};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use turul_jrpc::BatchEngine;
use turul_jrpc::response::PARSE_ERROR_RESPONSE;

use crate::cors::CorsLayer;
use crate::server::ServerConfig;

/// Shared per-server request handler, cheap to clone into connections
#[derive(Debug, Clone)]
pub struct RpcHttpHandler {
    config: Arc<ServerConfig>,
    engine: BatchEngine,
}

impl RpcHttpHandler {
    pub fn new(config: Arc<ServerConfig>, engine: BatchEngine) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn engine(&self) -> &BatchEngine {
        &self.engine
    }

    /// Handle one HTTP request.
    ///
    /// The engine runs under a cancellation token that fires if this future
    /// is dropped before completing, e.g. when the client disconnects.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let mut response = self.route(req).await;
        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }

    async fn route<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        if req.uri().path() != self.config.rpc_path {
            debug!(path = %req.uri().path(), "No endpoint at path");
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        match *req.method() {
            Method::POST => {}
            Method::OPTIONS if self.config.enable_cors => {
                return empty_response(StatusCode::NO_CONTENT);
            }
            _ => {
                debug!(method = %req.method(), "Rejected non-POST request");
                let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static("POST"));
                return response;
            }
        }

        let body = match Limited::new(req.into_body(), self.config.max_body_size)
            .collect()
            .await
        {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                warn!(error = %err, "Failed to read request body");
                return json_response(Bytes::from_static(PARSE_ERROR_RESPONSE));
            }
        };

        let cancellation = CancellationToken::new();
        let guard = cancellation.clone().drop_guard();
        let output = self
            .engine
            .handle_with_cancellation(&body, cancellation)
            .await;
        // Completed normally, detached handlers keep a live token
        guard.disarm();

        if output.is_empty() {
            empty_response(StatusCode::NO_CONTENT)
        } else {
            json_response(Bytes::from(output))
        }
    }
}

fn json_response(body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn text_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(text.as_bytes())));
    *response.status_mut() = status;
    response
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
