use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{
    Client, Method, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult, HttpError},
    model::HttpMethod,
};

pub const DEFAULT_USER_AGENT: &str = concat!("loadforge/", env!("CARGO_PKG_VERSION"));

/// One outgoing call. `target` is either a path relative to the client's base
/// URL or an absolute `http(s)` URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub target: String,
    pub json_body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: HttpMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            json_body: None,
        }
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// An HTTP client shared by every caller of a run. Implementations must accept
/// concurrent `execute` calls.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub default_headers: Vec<(HeaderName, String)>,
    pub request_timeout: Duration,
}

impl ClientOptions {
    #[must_use]
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: Vec::new(),
            request_timeout,
        }
    }

    /// Adds `Authorization: Bearer <token>` to every request.
    #[must_use]
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.default_headers
            .push((AUTHORIZATION, format!("Bearer {}", token)));
        self
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.default_headers
            .iter()
            .find(|(name, _)| *name == AUTHORIZATION)
            .and_then(|(_, value)| value.strip_prefix("Bearer "))
    }
}

/// Builds transports. The run asks for one private transport for the auth
/// preflight and one shared transport for the load itself.
pub trait Connector: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the options cannot produce a working client.
    fn connect(&self, options: &ClientOptions) -> AppResult<Arc<dyn Transport>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestConnector;

impl Connector for ReqwestConnector {
    fn connect(&self, options: &ClientOptions) -> AppResult<Arc<dyn Transport>> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(options)?);
        Ok(transport)
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Builds the reqwest client with the configured default headers.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL, a header value, or the client
    /// builder is invalid.
    pub fn new(options: &ClientOptions) -> AppResult<Self> {
        let base_url = Url::parse(&options.base_url).map_err(|err| {
            AppError::http(HttpError::InvalidBaseUrl {
                url: options.base_url.clone(),
                source: err,
            })
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &options.default_headers {
            let mut header = HeaderValue::from_str(value).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderValue {
                    header: name.as_str().to_owned(),
                    source: err,
                })
            })?;
            if *name == AUTHORIZATION {
                header.set_sensitive(true);
            }
            headers.insert(name.clone(), header);
        }

        let client = Client::builder()
            .timeout(options.request_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;

        Ok(Self { client, base_url })
    }

    /// Absolute `http(s)` targets are used verbatim; anything else is appended
    /// to the base URL's path.
    ///
    /// # Errors
    ///
    /// Returns `JoinUrlFailed` when the joined URL is invalid.
    pub fn resolve_url(&self, target: &str) -> Result<Url, HttpError> {
        join_target(&self.base_url, target)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.resolve_url(&request.target)?;
        let url_text = url.to_string();

        let mut builder = self.client.request(Method::from(request.method), url);
        if let Some(body) = request.json_body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_connect() {
                HttpError::Unreachable {
                    url: url_text.clone(),
                    reason: root_cause(&err),
                }
            } else {
                HttpError::RequestFailed {
                    url: url_text.clone(),
                    source: err,
                }
            }
        })?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = collect_body(response)
            .await
            .map_err(|err| HttpError::ReadBodyFailed {
                url: url_text,
                source: err,
            })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

pub(crate) fn join_target(base: &Url, target: &str) -> Result<Url, HttpError> {
    if let Ok(absolute) = Url::parse(target)
        && matches!(absolute.scheme(), "http" | "https")
    {
        return Ok(absolute);
    }

    let mut prefix = base.clone();
    if !prefix.path().ends_with('/') {
        let path = format!("{}/", prefix.path());
        prefix.set_path(&path);
    }
    prefix
        .join(target.trim_start_matches('/'))
        .map_err(|err| HttpError::JoinUrlFailed {
            url: target.to_owned(),
            source: err,
        })
}

/// Innermost error text, e.g. "Connection refused (os error 111)".
fn root_cause(err: &reqwest::Error) -> String {
    let mut cause: &dyn std::error::Error = err;
    while let Some(next) = cause.source() {
        cause = next;
    }
    cause.to_string()
}

async fn collect_body(response: reqwest::Response) -> Result<Vec<u8>, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk?);
    }
    Ok(body)
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }
}
