use std::time::Duration;

use reqwest::header::HeaderValue;
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{
    context::{Context, interpolate, resolve_value},
    error::{AuthError, ConfigError},
    model::{AuthBlock, HttpMethod, unquote},
};

use super::plan::compile_json_path;
use super::transport::{HttpRequest, Transport};

/// Everything the preflight learned, successful or not.
#[derive(Debug)]
pub struct PreflightReport {
    pub endpoint: String,
    pub method: HttpMethod,
    pub elapsed: Duration,
    pub token: Result<String, AuthError>,
}

/// Performs the login call and extracts the bearer token.
///
/// Never fails outright: every problem ends up in `PreflightReport::token`.
pub async fn run_auth_preflight(
    transport: &dyn Transport,
    auth: &AuthBlock,
    context: &Context,
) -> PreflightReport {
    let started = Instant::now();
    let endpoint = resolve_endpoint(auth, context);
    let shown = endpoint
        .as_ref()
        .map_or_else(|_| auth.endpoint.to_string(), Clone::clone);

    info!("Running auth preflight: {} {}", auth.method, shown);
    let token = match endpoint {
        Ok(endpoint) => login(transport, auth, context, endpoint).await,
        Err(err) => Err(AuthError::from(err)),
    };

    PreflightReport {
        endpoint: shown,
        method: auth.method,
        elapsed: started.elapsed(),
        token,
    }
}

fn resolve_endpoint(auth: &AuthBlock, context: &Context) -> Result<String, ConfigError> {
    let endpoint = resolve_value(&auth.endpoint, context)?;
    interpolate(&endpoint, context)
}

async fn login(
    transport: &dyn Transport,
    auth: &AuthBlock,
    context: &Context,
    endpoint: String,
) -> Result<String, AuthError> {
    let token_path = compile_json_path(&auth.token_path)?;

    let mut payload = Map::new();
    for field in &auth.body {
        let value = resolve_value(&field.value, context)?;
        payload.insert(field.name.clone(), Value::String(value));
    }

    let request = HttpRequest::new(auth.method, endpoint).with_json(Value::Object(payload));
    let response = transport.execute(request).await?;
    if !response.is_success() {
        return Err(AuthError::Status {
            status: response.status,
        });
    }

    let body = response.json().map_err(|err| AuthError::InvalidBody {
        message: err.to_string(),
    })?;
    let nodes = token_path.query(&body);
    let token = nodes.first().ok_or_else(|| AuthError::TokenNotFound {
        path: unquote(&auth.token_path).to_owned(),
    })?;

    let token = token
        .as_str()
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::TokenNotString)?;
    if HeaderValue::from_str(&format!("Bearer {}", token)).is_err() {
        return Err(AuthError::TokenNotHeaderSafe);
    }
    debug!("Auth preflight produced a token of {} bytes", token.len());
    Ok(token.to_owned())
}
