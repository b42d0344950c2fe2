//! Configuration-driven provider construction.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;
use crate::models::ProviderId;
use crate::prober::ProbeConfig;

use super::quote_api::QuoteApiProvider;
use super::snapshot_api::SnapshotApiProvider;
use super::SnapshotProvider;

/// Settings for one configured provider.
///
/// ```json
/// { "id": "relay", "timeoutMs": 10000,
///   "kind": { "type": "quoteApi", "baseUrl": "https://api.relay.example" } }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    pub id: ProviderId,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Overrides the default per-call deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    pub kind: ProviderKind,
}

fn default_enabled() -> bool {
    true
}

/// How a provider talks to its upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProviderKind {
    /// Upstream returns complete snapshots.
    #[serde(rename_all = "camelCase")]
    SnapshotApi {
        base_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },

    /// Upstream only quotes; the snapshot is assembled locally.
    #[serde(rename_all = "camelCase")]
    QuoteApi {
        base_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        probe: Option<ProbeConfig>,
    },
}

impl ProviderSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Instantiate the provider described by these settings.
    pub fn build(&self) -> Result<Arc<dyn SnapshotProvider>, MarketDataError> {
        let provider: Arc<dyn SnapshotProvider> = match &self.kind {
            ProviderKind::SnapshotApi { base_url, api_key } => {
                check_base_url(self.id, base_url)?;
                let mut provider = SnapshotApiProvider::new(self.id, base_url.clone())?;
                if let Some(key) = api_key {
                    provider = provider.with_api_key(key.clone());
                }
                if let Some(timeout) = self.timeout() {
                    provider = provider.with_timeout(timeout)?;
                }
                Arc::new(provider)
            }
            ProviderKind::QuoteApi {
                base_url,
                api_key,
                probe,
            } => {
                check_base_url(self.id, base_url)?;
                let mut provider = QuoteApiProvider::new(self.id, base_url.clone())?;
                if let Some(key) = api_key {
                    provider = provider.with_api_key(key.clone());
                }
                if let Some(timeout) = self.timeout() {
                    provider = provider.with_timeout(timeout)?;
                }
                if let Some(probe) = probe {
                    provider = provider.with_probe_config(probe.clone());
                }
                Arc::new(provider)
            }
        };
        Ok(provider)
    }
}

fn check_base_url(id: ProviderId, base_url: &str) -> Result<(), MarketDataError> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(())
    } else {
        Err(MarketDataError::Configuration(format!(
            "{}: baseUrl '{}' must be an http(s) URL",
            id, base_url
        )))
    }
}

/// Build every enabled provider in `settings`.
///
/// Duplicate ids (enabled or not) are a configuration error.
pub fn build_providers(
    settings: &[ProviderSettings],
) -> Result<Vec<Arc<dyn SnapshotProvider>>, MarketDataError> {
    let mut seen = HashSet::with_capacity(settings.len());
    for entry in settings {
        if !seen.insert(entry.id) {
            return Err(MarketDataError::Configuration(format!(
                "Provider {} is configured more than once",
                entry.id
            )));
        }
    }

    let mut providers = Vec::with_capacity(settings.len());
    for entry in settings {
        if !entry.enabled {
            debug!("Provider {} is disabled", entry.id);
            continue;
        }
        providers.push(entry.build()?);
    }

    info!(
        "Built {} of {} configured providers",
        providers.len(),
        settings.len()
    );
    Ok(providers)
}
