//! Shared HTTP plumbing for REST-backed providers.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::errors::MarketDataError;
use crate::models::ProviderId;

/// Build a client whose request timeout matches the provider deadline.
pub(crate) fn build_client(
    provider: ProviderId,
    timeout: Duration,
) -> Result<Client, MarketDataError> {
    Client::builder().timeout(timeout).build().map_err(|e| {
        MarketDataError::Configuration(format!("{}: failed to build HTTP client: {}", provider, e))
    })
}

/// Attach the API key, if any, as a bearer token.
pub(crate) fn with_api_key(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) if !key.is_empty() => request.bearer_auth(key),
        _ => request,
    }
}

/// Send a request and read the body of a successful response.
///
/// Timeouts, other transport errors and non-2xx statuses all map to
/// provider-scoped errors.
pub(crate) async fn send(
    provider: ProviderId,
    request: RequestBuilder,
) -> Result<String, MarketDataError> {
    let response = request.send().await.map_err(|e| transport_error(provider, e))?;
    read_body(provider, response).await
}

async fn read_body(provider: ProviderId, response: Response) -> Result<String, MarketDataError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(MarketDataError::unavailable(
            provider,
            "Invalid or missing API key",
        ));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MarketDataError::unavailable(
            provider,
            format!("HTTP {} - {}", status, body),
        ));
    }

    response
        .text()
        .await
        .map_err(|e| MarketDataError::unavailable(provider, format!("Failed to read response: {}", e)))
}

fn transport_error(provider: ProviderId, error: reqwest::Error) -> MarketDataError {
    if error.is_timeout() {
        MarketDataError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        MarketDataError::Network(error)
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
