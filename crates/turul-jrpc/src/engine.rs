//! Batch processing engine
//!
//! A call moves through four stages: parse the top-level shape, dispatch one
//! unit of work per request onto a [`WorkerPool`], collect finished entries,
//! render them. Entries are rendered in completion order; clients correlate
//! responses by id, not by position.

use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use serde_json::value::RawValue;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, warn};

use crate::context::RequestContext;
use crate::error::RpcError;
use crate::handler::MethodHandler;
use crate::pool::{Task, WorkerPool};
use crate::registry::MethodRegistry;
use crate::request::RequestEnvelope;
use crate::response::{self, ResultEntry};
use crate::types::RequestId;

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Reject request objects whose `jsonrpc` member is not `"2.0"`
    pub require_version: bool,
    /// Runtime that fire-and-forget handlers are spawned on. Defaults to the
    /// runtime driving the call.
    pub detached_runtime: Option<Handle>,
}

/// Top-level payload, members still raw
enum Payload {
    Single(Box<RawValue>),
    Batch(Vec<Box<RawValue>>),
}

/// JSON-RPC 2.0 request-batch engine
#[derive(Debug, Clone)]
pub struct BatchEngine {
    registry: Arc<MethodRegistry>,
    config: EngineConfig,
}

impl BatchEngine {
    pub fn new(registry: MethodRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: MethodRegistry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    pub fn require_version(mut self, require: bool) -> Self {
        self.config.require_version = require;
        self
    }

    pub fn detached_runtime(mut self, handle: Handle) -> Self {
        self.config.detached_runtime = Some(handle);
        self
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process a raw payload with no external cancellation
    pub async fn handle(&self, payload: &[u8]) -> Vec<u8> {
        self.handle_with_cancellation(payload, CancellationToken::new())
            .await
    }

    /// Process a raw payload and return the response bytes.
    ///
    /// The output is empty when nothing needs answering (notifications only).
    /// If `cancellation` fires, units not yet claimed never run and the
    /// entries collected so far are rendered.
    pub async fn handle_with_cancellation(
        &self,
        payload: &[u8],
        cancellation: CancellationToken,
    ) -> Vec<u8> {
        let (requests, is_batch) = match parse_payload(payload) {
            Ok(Payload::Batch(requests)) if requests.is_empty() => {
                debug!("Empty batch");
                return response::INVALID_REQUEST_RESPONSE.to_vec();
            }
            Ok(Payload::Batch(requests)) => (requests, true),
            Ok(Payload::Single(request)) => (vec![request], false),
            Err(err) => {
                debug!(error = %err, "Payload is not valid JSON");
                return response::PARSE_ERROR_RESPONSE.to_vec();
            }
        };

        let expected = requests.len();
        debug!(requests = expected, batch = is_batch, "Dispatching JSON-RPC payload");

        let units: Vec<Task<Option<ResultEntry>>> = requests
            .into_iter()
            .map(|request| self.work_unit(request, cancellation.clone()))
            .collect();

        let mut results = WorkerPool::run(units, cancellation.clone());
        let mut entries = Vec::with_capacity(expected);

        loop {
            tokio::select! {
                biased;
                next = results.next() => match next {
                    Some(Some(entry)) => entries.push(entry),
                    Some(None) => {}
                    None => break,
                },
                _ = cancellation.cancelled() => {
                    debug!(
                        collected = entries.len(),
                        expected,
                        "Cancelled before all requests completed"
                    );
                    break;
                }
            }
        }

        response::render(entries, is_batch)
    }

    fn work_unit(
        &self,
        request: Box<RawValue>,
        cancellation: CancellationToken,
    ) -> Task<Option<ResultEntry>> {
        let engine = self.clone();
        async move { engine.dispatch(request, cancellation).await }.boxed()
    }

    /// Full dispatch of one request object. `None` means nothing is rendered.
    async fn dispatch(
        &self,
        request: Box<RawValue>,
        cancellation: CancellationToken,
    ) -> Option<ResultEntry> {
        let Some(envelope) = RequestEnvelope::parse(&request) else {
            return Some(ResultEntry::error(
                RequestId::Null,
                RpcError::invalid_request(None),
            ));
        };

        let id = envelope.id();

        if self.config.require_version && !envelope.version_matches() {
            return Some(ResultEntry::error(id, RpcError::invalid_request(None)));
        }

        // A malformed request is never a legitimate notification
        let Some(method) = envelope.method() else {
            return Some(ResultEntry::error(id, RpcError::invalid_request(None)));
        };

        let params = envelope.into_params();

        let Some(descriptor) = self.registry.lookup(&method) else {
            debug!(method = %method, id = %id, "Method not found");
            if id.is_notification() {
                return None;
            }
            return Some(ResultEntry::error(id, RpcError::method_not_found(None)));
        };

        debug!(method = %method, id = %id, "Dispatching request");
        let ctx = RequestContext::new(method, id, params, cancellation);

        if descriptor.suppress_response() || ctx.is_notification() {
            self.spawn_detached(Arc::clone(descriptor.handler()), ctx);
            return None;
        }

        let id = ctx.id().clone();
        let entry = match descriptor.handler().call(ctx).await {
            Ok(result) => ResultEntry::success(id, result),
            Err(err) => ResultEntry::error(id, RpcError::from_handler_error(err)),
        };
        Some(entry)
    }

    /// Run a handler whose outcome is never rendered. It may outlive the
    /// call; failures are only logged.
    fn spawn_detached(&self, handler: Arc<dyn MethodHandler>, ctx: RequestContext) {
        let method = ctx.method().to_string();
        let id = ctx.id().clone();

        let task = async move {
            if let Err(err) = handler.call(ctx).await {
                let error = RpcError::from_handler_error(err);
                warn!(
                    method = %method,
                    id = %id,
                    code = error.code,
                    error = %error.message,
                    "Detached handler failed"
                );
            }
        }
        .in_current_span();

        match &self.config.detached_runtime {
            Some(runtime) => {
                runtime.spawn(task);
            }
            None => {
                tokio::spawn(task);
            }
        }
    }
}

/// Validate the whole payload and split a batch into its raw members.
/// Request members are decoded later, per unit.
fn parse_payload(payload: &[u8]) -> Result<Payload, serde_json::Error> {
    let raw: Box<RawValue> = serde_json::from_slice(payload)?;
    if raw.get().starts_with('[') {
        Ok(Payload::Batch(serde_json::from_str(raw.get())?))
    } else {
        Ok(Payload::Single(raw))
    }
}
