//! Provider backed by a REST endpoint that already speaks the snapshot
//! wire contract.
//!
//! `POST {base_url}/snapshot` with the [`SnapshotRequest`] as JSON body;
//! the response body is a single [`Snapshot`].

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::errors::MarketDataError;
use crate::models::{ProviderId, Snapshot, SnapshotRequest};
use crate::provider::http::{build_client, endpoint, send, with_api_key};
use crate::provider::{ProviderCapabilities, SnapshotProvider, DEFAULT_PROVIDER_TIMEOUT};

/// A provider whose upstream returns complete snapshots.
pub struct SnapshotApiProvider {
    id: ProviderId,
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    capabilities: ProviderCapabilities,
}

impl SnapshotApiProvider {
    pub fn new(id: ProviderId, base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        Ok(Self {
            id,
            client: build_client(id, DEFAULT_PROVIDER_TIMEOUT)?,
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            capabilities: ProviderCapabilities::full(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Replace the per-request deadline, rebuilding the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, MarketDataError> {
        self.client = build_client(self.id, timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

#[async_trait]
impl SnapshotProvider for SnapshotApiProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities.clone()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn get_snapshot(&self, request: &SnapshotRequest) -> Result<Snapshot, MarketDataError> {
        let url = endpoint(&self.base_url, "snapshot");
        debug!(
            "{} snapshot request: {} routes, {} notionals",
            self.id,
            request.routes.len(),
            request.notionals.len()
        );

        let http = with_api_key(self.client.post(&url).json(request), self.api_key.as_deref());
        let body = send(self.id, http).await?;

        parse_snapshot(self.id, &body)
    }
}

fn parse_snapshot(provider: ProviderId, body: &str) -> Result<Snapshot, MarketDataError> {
    serde_json::from_str(body).map_err(|e| {
        MarketDataError::unavailable(provider, format!("Failed to parse snapshot: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureScope;

    #[test]
    fn test_parse_snapshot() {
        let body = r#"{
            "volumes": [{"window": "24h", "volumeUsd": 1250000.5, "measuredAt": "2026-01-01T00:00:00Z"}],
            "listedAssets": {
                "assets": [{
                    "assetId": "1cs_v1:eth:native:coin",
                    "blockchain": "eth",
                    "namespace": "native",
                    "reference": "coin",
                    "symbol": "ETH",
                    "decimals": 18
                }],
                "measuredAt": "2026-01-01T00:00:00Z"
            }
        }"#;

        let snapshot = parse_snapshot(ProviderId::Across, body).unwrap();
        assert_eq!(snapshot.volumes.len(), 1);
        assert_eq!(snapshot.listed_assets.len(), 1);
        assert!(snapshot.rates.is_none());
        assert!(snapshot.liquidity.is_none());
    }

    #[test]
    fn test_missing_required_field_is_provider_scoped() {
        let err = parse_snapshot(ProviderId::Across, r#"{"volumes": []}"#).unwrap_err();
        assert_eq!(err.scope(), FailureScope::Provider);
        assert!(matches!(err, MarketDataError::ProviderUnavailable { .. }));
    }

    #[test]
    fn test_builder_overrides() {
        let provider = SnapshotApiProvider::new(ProviderId::Stargate, "http://localhost:9000")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .unwrap()
            .with_capabilities(ProviderCapabilities::listing_only());

        assert_eq!(provider.id(), ProviderId::Stargate);
        assert_eq!(provider.timeout(), Duration::from_secs(5));
        assert!(!provider.capabilities().supports_rates);
    }
}
