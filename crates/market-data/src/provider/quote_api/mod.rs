//! Provider built on a plain quote endpoint.
//!
//! The upstream only answers single quotes and a token list:
//! - `GET {base_url}/tokens` for the listing
//! - `GET {base_url}/quote?originAsset=..&destinationAsset=..&amount=..`
//!
//! Everything else in the snapshot is derived here: rates per route ×
//! notional through the normalizer, liquidity depth through the prober.
//! There is no volume API, so volumes are always empty.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use tokio::time::Instant;
use urlencoding::encode;

use crate::asset_id::{default_codec, AssetIdCodec};
use crate::errors::{FailureScope, MarketDataError};
use crate::models::{Asset, ListedAssets, ProviderId, Rate, Route, Snapshot, SnapshotRequest};
use crate::normalizer::{build_rate, usd_from_f64};
use crate::prober::{DepthProber, ProbeConfig};
use crate::provider::http::{build_client, endpoint, send, with_api_key};
use crate::provider::{
    ProviderCapabilities, QuoteSource, SnapshotProvider, DEFAULT_PROVIDER_TIMEOUT,
};

use models::{QuoteResponse, TokenEntry, TokenListResponse};

/// A provider that assembles snapshots from individual quotes.
pub struct QuoteApiProvider {
    id: ProviderId,
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    prober: DepthProber,
}

impl QuoteApiProvider {
    pub fn new(id: ProviderId, base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        Ok(Self {
            id,
            client: build_client(id, DEFAULT_PROVIDER_TIMEOUT)?,
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            prober: DepthProber::default(),
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

    pub fn with_probe_config(mut self, config: ProbeConfig) -> Self {
        self.prober = DepthProber::new(config);
        self
    }

    async fn fetch_listing(&self) -> Result<ListedAssets, MarketDataError> {
        let url = endpoint(&self.base_url, "tokens");
        let body = send(
            self.id,
            with_api_key(self.client.get(&url), self.api_key.as_deref()),
        )
        .await?;

        let response: TokenListResponse = serde_json::from_str(&body).map_err(|e| {
            MarketDataError::unavailable(self.id, format!("Failed to parse token list: {}", e))
        })?;

        Ok(listing_from_tokens(default_codec(), response.tokens, Utc::now()))
    }
}

#[async_trait]
impl QuoteSource for QuoteApiProvider {
    async fn quote(&self, route: &Route, amount_in: &str) -> Result<Rate, MarketDataError> {
        let url = format!(
            "{}?originAsset={}&destinationAsset={}&amount={}",
            endpoint(&self.base_url, "quote"),
            encode(&route.source.asset_id),
            encode(&route.destination.asset_id),
            encode(amount_in)
        );

        let body = send(
            self.id,
            with_api_key(self.client.get(&url), self.api_key.as_deref()),
        )
        .await?;

        let response: QuoteResponse = serde_json::from_str(&body).map_err(|e| {
            MarketDataError::unavailable(self.id, format!("Failed to parse quote: {}", e))
        })?;

        rate_from_quote(route, amount_in, response, Utc::now())
    }
}

#[async_trait]
impl SnapshotProvider for QuoteApiProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_rates: true,
            supports_liquidity: true,
            volume_windows: &[],
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn get_snapshot(&self, request: &SnapshotRequest) -> Result<Snapshot, MarketDataError> {
        let listing = self.fetch_listing().await?;
        // Probing must finish well inside the provider deadline
        let prober = self.prober.capped(self.timeout / 2);
        build_quote_snapshot(self.id, self, &prober, listing, request).await
    }
}

/// Assemble a snapshot from a listing and a quote source.
///
/// One rate per route × notional and one depth record per route. A failed
/// quote drops that rate only, unless every quote failed with a
/// provider-scoped error, in which case that error is returned.
///
/// Depth probing for all routes shares the prober's budget; routes probed
/// after it runs out get no thresholds.
pub async fn build_quote_snapshot<Q>(
    provider: ProviderId,
    source: &Q,
    prober: &DepthProber,
    listed_assets: ListedAssets,
    request: &SnapshotRequest,
) -> Result<Snapshot, MarketDataError>
where
    Q: QuoteSource + ?Sized,
{
    let mut rates = Vec::with_capacity(request.routes.len() * request.notionals.len());
    let mut provider_error = None;

    for route in &request.routes {
        for notional in &request.notionals {
            match source.quote(route, notional).await {
                Ok(rate) => rates.push(rate),
                Err(e) => {
                    warn!(
                        "{}: no rate for {} -> {} at {}: {}",
                        provider, route.source.asset_id, route.destination.asset_id, notional, e
                    );
                    if e.scope() == FailureScope::Provider && provider_error.is_none() {
                        provider_error = Some(e);
                    }
                }
            }
        }
    }

    if rates.is_empty() {
        if let Some(e) = provider_error {
            return Err(e);
        }
    }

    let deadline = Instant::now() + prober.budget();
    let mut liquidity = Vec::with_capacity(request.routes.len());
    for route in &request.routes {
        liquidity.push(prober.probe_depth_until(source, route, deadline).await);
    }

    debug!(
        "{}: {} volume windows unavailable (no volume API)",
        provider,
        request.include_windows.len()
    );

    Ok(Snapshot {
        volumes: Vec::new(),
        listed_assets,
        rates: Some(rates),
        liquidity: Some(liquidity),
    })
}

fn listing_from_tokens(
    codec: &AssetIdCodec,
    tokens: Vec<TokenEntry>,
    measured_at: DateTime<Utc>,
) -> ListedAssets {
    let assets = tokens
        .into_iter()
        .map(|token| {
            let mut asset = Asset::from_contract(
                codec,
                &token.chain,
                token.address.as_deref(),
                token.symbol,
                token.decimals,
            );
            asset.name = token.name;
            asset.icon_url = token.logo_url;
            asset.price = token.price_usd.filter(|p| p.is_finite());
            asset
        })
        .collect();
    ListedAssets::new(assets, measured_at)
}

fn rate_from_quote(
    route: &Route,
    amount_in: &str,
    response: QuoteResponse,
    quoted_at: DateTime<Utc>,
) -> Result<Rate, MarketDataError> {
    let fees: Vec<_> = response
        .fees
        .iter()
        .map(|fee| fee.amount_usd.and_then(usd_from_f64))
        .collect();

    build_rate(
        route.source.clone(),
        route.destination.clone(),
        amount_in.to_string(),
        response.amount_out,
        &fees,
        quoted_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn route() -> Route {
        let codec = AssetIdCodec::new();
        Route::new(
            Asset::from_contract(&codec, "ethereum", Some("0xa0b8"), "USDC", 6),
            Asset::from_contract(&codec, "solana", Some("EPjF"), "USDC", 6),
        )
    }

    /// Flat 5 bps fee, unlimited depth.
    struct FlatQuotes {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteSource for FlatQuotes {
        async fn quote(&self, route: &Route, amount_in: &str) -> Result<Rate, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let amount: u128 = amount_in.parse().unwrap();
            let response = QuoteResponse {
                amount_out: (amount - amount / 2_000).to_string(),
                fees: vec![models::FeeEntry {
                    amount_usd: Some(0.5),
                }],
            };
            rate_from_quote(route, amount_in, response, Utc::now())
        }
    }

    /// Quotes the request notional instantly; anything else hangs.
    struct SlowDepth {
        notional: &'static str,
    }

    #[async_trait]
    impl QuoteSource for SlowDepth {
        async fn quote(&self, route: &Route, amount_in: &str) -> Result<Rate, MarketDataError> {
            if amount_in != self.notional {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            let response = QuoteResponse {
                amount_out: amount_in.to_string(),
                fees: Vec::new(),
            };
            rate_from_quote(route, amount_in, response, Utc::now())
        }
    }

    struct Offline;

    #[async_trait]
    impl QuoteSource for Offline {
        async fn quote(&self, _route: &Route, _amount_in: &str) -> Result<Rate, MarketDataError> {
            Err(MarketDataError::unavailable("relay", "connection refused"))
        }
    }

    #[test]
    fn test_listing_from_tokens() {
        let body = r#"{"tokens": [
            {"chain": "ethereum", "address": "0xa0b8", "symbol": "USDC", "decimals": 6, "logoUrl": "https://x/usdc.png"},
            {"chain": "eth", "address": "0xa0b8", "symbol": "USDC", "decimals": 6},
            {"chain": "solana", "symbol": "SOL", "decimals": 9, "priceUsd": 150.25}
        ]}"#;
        let response: TokenListResponse = serde_json::from_str(body).unwrap();

        let listing = listing_from_tokens(&AssetIdCodec::new(), response.tokens, Utc::now());

        assert_eq!(listing.len(), 2);
        assert_eq!(listing.assets[0].asset_id, "1cs_v1:eth:erc20:0xa0b8");
        assert_eq!(
            listing.assets[0].icon_url.as_deref(),
            Some("https://x/usdc.png")
        );
        assert_eq!(listing.assets[1].asset_id, "1cs_v1:sol:native:coin");
        assert_eq!(listing.assets[1].price, Some(150.25));
    }

    #[test]
    fn test_rate_from_quote() {
        let response: QuoteResponse = serde_json::from_str(
            r#"{"amountOut": "999500", "fees": [{"amountUsd": 0.25}, {}, {"amountUsd": 0.05}]}"#,
        )
        .unwrap();

        let rate = rate_from_quote(&route(), "1000000", response, Utc::now()).unwrap();

        assert_eq!(rate.effective_rate, 0.9995);
        assert_eq!(rate.total_fees_usd, Some(0.3));
    }

    #[test]
    fn test_rate_from_quote_rejects_bad_amount() {
        let response: QuoteResponse = serde_json::from_str(r#"{"amountOut": "1.5"}"#).unwrap();
        let err = rate_from_quote(&route(), "1000000", response, Utc::now()).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidRateInput(_)));
    }

    #[tokio::test]
    async fn test_build_quote_snapshot() {
        let source = FlatQuotes {
            calls: AtomicUsize::new(0),
        };
        let request = SnapshotRequest {
            routes: vec![route()],
            notionals: vec!["1000000".to_string(), "250000000".to_string()],
            include_windows: Vec::new(),
        };

        let snapshot = build_quote_snapshot(
            ProviderId::Relay,
            &source,
            &DepthProber::default(),
            ListedAssets::empty(Utc::now()),
            &request,
        )
        .await
        .unwrap();

        let rates = snapshot.rates.unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[1].amount_in, "250000000");
        assert_eq!(rates[0].total_fees_usd, Some(0.5));

        let liquidity = snapshot.liquidity.unwrap();
        assert_eq!(liquidity.len(), 1);
        assert_eq!(liquidity[0].thresholds.len(), 2);
        assert!(snapshot.volumes.is_empty());
    }

    #[tokio::test]
    async fn test_listing_only_request_makes_no_quotes() {
        let source = FlatQuotes {
            calls: AtomicUsize::new(0),
        };

        let snapshot = build_quote_snapshot(
            ProviderId::Relay,
            &source,
            &DepthProber::default(),
            ListedAssets::empty(Utc::now()),
            &SnapshotRequest::listing_only(),
        )
        .await
        .unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(snapshot.rates, Some(Vec::new()));
        assert_eq!(snapshot.liquidity, Some(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probing_keeps_rates() {
        let source = SlowDepth { notional: "5000000" };
        let request = SnapshotRequest {
            routes: vec![route(), route()],
            notionals: vec!["5000000".to_string()],
            include_windows: Vec::new(),
        };
        let prober = DepthProber::default().capped(Duration::from_secs(2));

        let started = Instant::now();
        let snapshot = build_quote_snapshot(
            ProviderId::Relay,
            &source,
            &prober,
            ListedAssets::empty(Utc::now()),
            &request,
        )
        .await
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(snapshot.rates.unwrap().len(), 2);
        let liquidity = snapshot.liquidity.unwrap();
        assert_eq!(liquidity.len(), 2);
        assert!(liquidity.iter().all(|depth| depth.thresholds.is_empty()));
    }

    #[tokio::test]
    async fn test_offline_source_fails_the_provider() {
        let request = SnapshotRequest {
            routes: vec![route()],
            notionals: vec!["1000000".to_string()],
            include_windows: Vec::new(),
        };

        let result = build_quote_snapshot(
            ProviderId::Relay,
            &Offline,
            &DepthProber::default(),
            ListedAssets::empty(Utc::now()),
            &request,
        )
        .await;

        assert!(matches!(
            result,
            Err(MarketDataError::ProviderUnavailable { .. })
        ));
    }
}
