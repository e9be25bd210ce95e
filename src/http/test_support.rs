use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppResult, HttpError};

use super::transport::{ClientOptions, Connector, HttpRequest, HttpResponse, Transport};

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// In-memory transport answering every call through a closure.
pub(crate) struct ScriptedTransport {
    responder: Box<Responder>,
    latency: Duration,
    calls: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delays every response by `latency`.
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn always(status: u16, body: Value) -> Self {
        Self::new(move |_| Ok(json_response(status, &body)))
    }

    pub(crate) fn calls(&self) -> Vec<HttpRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = (self.responder)(&request);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }
        response
    }
}

pub(crate) fn json_response(status: u16, body: &Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_owned(), "application/json".to_owned())],
        body: body.to_string().into_bytes(),
    }
}

pub(crate) fn unreachable_error(url: &str) -> HttpError {
    HttpError::Unreachable {
        url: url.to_owned(),
        reason: "connection refused".to_owned(),
    }
}

/// Hands out the same scripted transport for every connect call and keeps the
/// options it was asked for.
pub(crate) struct StubConnector {
    transport: Arc<ScriptedTransport>,
    options: Mutex<Vec<ClientOptions>>,
}

impl StubConnector {
    pub(crate) fn new(transport: Arc<ScriptedTransport>) -> Self {
        Self {
            transport,
            options: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn connected(&self) -> Vec<ClientOptions> {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Connector for StubConnector {
    fn connect(&self, options: &ClientOptions) -> AppResult<Arc<dyn Transport>> {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(options.clone());
        let transport: Arc<dyn Transport> = self.transport.clone();
        Ok(transport)
    }
}

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}
