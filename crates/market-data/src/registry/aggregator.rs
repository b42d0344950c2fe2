//! Aggregation router fanning one request out to many providers.
//!
//! Every selected provider runs concurrently in its own task:
//! - bounded by its own deadline (capped by [`AggregatorConfig`])
//! - isolated from panics in other providers
//! - validated before its snapshot is accepted
//!
//! A provider that fails in any of these ways is left out of the result
//! map and recorded in [`AggregateDiagnostics`]; the others are unaffected.
//! Dropping the aggregation future aborts every provider task still running.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use log::{debug, info, warn};
use tokio::task::{self, JoinError, JoinSet};

use super::diagnostics::{AggregateDiagnostics, ProviderOutcome};
use super::validator::SnapshotValidator;
use crate::asset_id::default_codec;
use crate::errors::MarketDataError;
use crate::models::{AggregatedSnapshots, ProviderId, Route, Snapshot, SnapshotRequest};
use crate::provider::{SnapshotProvider, DEFAULT_PROVIDER_TIMEOUT};

/// Aggregation-wide settings.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    /// Upper bound on any single provider's deadline.
    pub default_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

/// Routes snapshot requests to registered providers and merges the results.
pub struct Aggregator {
    providers: BTreeMap<ProviderId, Arc<dyn SnapshotProvider>>,
    validator: Arc<SnapshotValidator>,
    config: AggregatorConfig,
}

impl Aggregator {
    /// Create an aggregator over `providers`.
    ///
    /// If two providers share an id, the first one registered is kept.
    pub fn new(providers: Vec<Arc<dyn SnapshotProvider>>) -> Self {
        Self::with_config(providers, AggregatorConfig::default())
    }

    /// Create an aggregator with custom configuration.
    pub fn with_config(
        providers: Vec<Arc<dyn SnapshotProvider>>,
        config: AggregatorConfig,
    ) -> Self {
        let mut registered = BTreeMap::new();
        for provider in providers {
            let id = provider.id();
            if registered.contains_key(&id) {
                warn!("Provider {} registered twice, keeping the first", id);
                continue;
            }
            registered.insert(id, provider);
        }

        Self {
            providers: registered,
            validator: Arc::new(SnapshotValidator::new()),
            config,
        }
    }

    /// Replace the snapshot validator.
    pub fn with_validator(mut self, validator: SnapshotValidator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Registered provider ids, sorted.
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }

    /// Providers matching `filter`, or all registered ones.
    ///
    /// Ids in the filter that are not registered are ignored. Fails with
    /// [`MarketDataError::Configuration`] if nothing is left.
    pub fn select(
        &self,
        filter: Option<&[ProviderId]>,
    ) -> Result<Vec<Arc<dyn SnapshotProvider>>, MarketDataError> {
        let selected: Vec<_> = match filter {
            None => self.providers.values().cloned().collect(),
            Some(ids) => self
                .providers
                .iter()
                .filter(|(id, _)| ids.contains(id))
                .map(|(_, provider)| Arc::clone(provider))
                .collect(),
        };

        if selected.is_empty() {
            let wanted = match filter {
                Some(ids) => ids
                    .iter()
                    .map(ProviderId::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                None => "all".to_string(),
            };
            return Err(MarketDataError::Configuration(format!(
                "No registered providers match [{}]",
                wanted
            )));
        }
        Ok(selected)
    }

    /// Fetch snapshots from every selected provider.
    ///
    /// Returns only the providers that succeeded and passed validation,
    /// keyed by id. Errors only for a malformed request or an empty
    /// selection.
    pub async fn aggregate(
        &self,
        request: &SnapshotRequest,
        filter: Option<&[ProviderId]>,
    ) -> Result<AggregatedSnapshots, MarketDataError> {
        self.aggregate_with_diagnostics(request, filter).await.0
    }

    /// Like [`aggregate`](Self::aggregate), also reporting what happened to
    /// each provider.
    pub async fn aggregate_with_diagnostics(
        &self,
        request: &SnapshotRequest,
        filter: Option<&[ProviderId]>,
    ) -> (
        Result<AggregatedSnapshots, MarketDataError>,
        AggregateDiagnostics,
    ) {
        let mut diagnostics = AggregateDiagnostics::new();

        if let Err(e) = request.validate() {
            warn!("Rejected snapshot request: {}", e);
            return (Err(e), diagnostics);
        }

        let selected = match self.select(filter) {
            Ok(selected) => selected,
            Err(e) => {
                warn!("{}", e);
                return (Err(e), diagnostics);
            }
        };

        for id in self.providers.keys() {
            if !selected.iter().any(|p| p.id() == *id) {
                diagnostics.record_skip(*id);
            }
        }

        let request = Arc::new(usable_routes(request));
        let fan_out = Instant::now();
        let mut tasks = JoinSet::new();
        let mut spawned: HashMap<task::Id, ProviderId> = HashMap::with_capacity(selected.len());

        for provider in selected {
            let id = provider.id();
            let request = Arc::clone(&request);
            let deadline = provider.timeout().min(self.config.default_timeout);
            debug!("Requesting snapshot from {} (deadline {:?})", id, deadline);

            let handle = tasks.spawn(async move {
                let started = Instant::now();
                let call = AssertUnwindSafe(async { provider.get_snapshot(&request).await })
                    .catch_unwind();
                let outcome = tokio::time::timeout(deadline, call).await;
                (id, started.elapsed(), deadline, outcome)
            });
            spawned.insert(handle.id(), id);
        }

        let mut results = BTreeMap::new();

        while let Some(joined) = tasks.join_next().await {
            let (id, elapsed, deadline, outcome) = match joined {
                Ok(output) => output,
                Err(e) => {
                    match spawned.get(&e.id()) {
                        Some(&id) => {
                            let outcome = join_failure(e);
                            warn!("Provider {} task did not complete: {}", id, outcome);
                            diagnostics.record(id, outcome, fan_out.elapsed());
                        }
                        None => warn!("Unknown provider task did not complete: {}", e),
                    }
                    continue;
                }
            };

            let outcome = match outcome {
                Ok(Ok(Ok(snapshot))) => match self.accept(id, &request, snapshot) {
                    Ok(snapshot) => {
                        results.insert(id, snapshot);
                        ProviderOutcome::Success
                    }
                    Err(e) => {
                        warn!("Snapshot from {} rejected: {}", id, e);
                        ProviderOutcome::Rejected {
                            message: e.to_string(),
                        }
                    }
                },
                Ok(Ok(Err(e))) => {
                    warn!("Provider {} failed: {}", id, e);
                    ProviderOutcome::Failed {
                        message: e.to_string(),
                    }
                }
                Ok(Err(payload)) => {
                    let message = panic_message(payload);
                    warn!("Provider {} panicked: {}", id, message);
                    ProviderOutcome::Panicked { message }
                }
                Err(_) => {
                    warn!("Provider {} timed out after {:?}", id, deadline);
                    ProviderOutcome::TimedOut { after: deadline }
                }
            };
            diagnostics.record(id, outcome, elapsed);
        }

        info!(
            "Aggregated {} provider snapshots. Diagnostics: {}",
            results.len(),
            diagnostics.summary()
        );
        (Ok(results), diagnostics)
    }

    fn accept(
        &self,
        id: ProviderId,
        request: &SnapshotRequest,
        snapshot: Snapshot,
    ) -> Result<Snapshot, MarketDataError> {
        let capabilities = self
            .providers
            .get(&id)
            .map(|provider| provider.capabilities())
            .unwrap_or_default();
        self.validator.validate(id, &capabilities, request, snapshot)
    }
}

/// Copy of `request` without routes whose assets have unusable ids.
fn usable_routes(request: &SnapshotRequest) -> SnapshotRequest {
    let codec = default_codec();
    let routes: Vec<Route> = request
        .routes
        .iter()
        .filter(|route| {
            let check = route
                .source
                .verify_identity(codec)
                .and_then(|_| route.destination.verify_identity(codec));
            match check {
                Ok(()) => true,
                Err(e) => {
                    warn!("Dropping route: {}", e);
                    false
                }
            }
        })
        .cloned()
        .collect();

    SnapshotRequest {
        routes,
        notionals: request.notionals.clone(),
        include_windows: request.include_windows.clone(),
    }
}

/// Outcome for a provider task that ended without producing a result.
fn join_failure(error: JoinError) -> ProviderOutcome {
    if error.is_panic() {
        ProviderOutcome::Panicked {
            message: panic_message(error.into_panic()),
        }
    } else {
        ProviderOutcome::Failed {
            message: error.to_string(),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, ListedAssets, TimeWindow, VolumeWindow};
    use std::future::Future;
    use std::pin::Pin;
    use crate::provider::ProviderCapabilities;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Ok,
        Fail,
        Hang,
        Panic,
        Malformed,
    }

    struct MockProvider {
        id: ProviderId,
        behavior: Behavior,
        call_count: AtomicUsize,
        routes_seen: AtomicUsize,
    }

    impl MockProvider {
        fn new(id: ProviderId, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                id,
                behavior,
                call_count: AtomicUsize::new(0),
                routes_seen: AtomicUsize::new(0),
            })
        }
    }

    fn eth() -> Asset {
        Asset::from_contract(default_codec(), "ethereum", None, "ETH", 18)
    }

    #[async_trait]
    impl SnapshotProvider for MockProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities::listing_only()
        }

        async fn get_snapshot(
            &self,
            request: &SnapshotRequest,
        ) -> Result<Snapshot, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.routes_seen.store(request.routes.len(), Ordering::SeqCst);

            match self.behavior {
                Behavior::Ok => Ok(Snapshot {
                    volumes: Vec::new(),
                    listed_assets: ListedAssets::new(vec![eth()], Utc::now()),
                    rates: None,
                    liquidity: None,
                }),
                Behavior::Fail => Err(MarketDataError::unavailable(self.id, "Mock failure")),
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                Behavior::Panic => panic!("mock provider blew up"),
                Behavior::Malformed => Ok(Snapshot {
                    volumes: vec![VolumeWindow {
                        window: TimeWindow::Day,
                        volume_usd: f64::NAN,
                        measured_at: Utc::now(),
                    }],
                    listed_assets: ListedAssets::new(vec![eth()], Utc::now()),
                    rates: None,
                    liquidity: None,
                }),
            }
        }
    }

    /// Panics while building its future, before any await point.
    struct EagerPanic;

    #[async_trait]
    impl SnapshotProvider for EagerPanic {
        fn id(&self) -> ProviderId {
            ProviderId::Axelar
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities::listing_only()
        }

        fn get_snapshot<'life0, 'life1, 'async_trait>(
            &'life0 self,
            _request: &'life1 SnapshotRequest,
        ) -> Pin<Box<dyn Future<Output = Result<Snapshot, MarketDataError>> + Send + 'async_trait>>
        where
            'life0: 'async_trait,
            'life1: 'async_trait,
            Self: 'async_trait,
        {
            panic!("no future for you")
        }
    }

    fn aggregator(providers: Vec<Arc<MockProvider>>) -> Aggregator {
        let providers = providers
            .into_iter()
            .map(|p| p as Arc<dyn SnapshotProvider>)
            .collect();
        Aggregator::with_config(
            providers,
            AggregatorConfig {
                default_timeout: Duration::from_millis(50),
            },
        )
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let aggregator = aggregator(vec![
            MockProvider::new(ProviderId::Across, Behavior::Ok),
            MockProvider::new(ProviderId::Relay, Behavior::Fail),
            MockProvider::new(ProviderId::Stargate, Behavior::Ok),
        ]);

        let results = aggregator
            .aggregate(&SnapshotRequest::listing_only(), None)
            .await
            .unwrap();

        let ids: Vec<_> = results.keys().copied().collect();
        assert_eq!(ids, vec![ProviderId::Across, ProviderId::Stargate]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_excludes_provider() {
        let aggregator = aggregator(vec![
            MockProvider::new(ProviderId::Across, Behavior::Ok),
            MockProvider::new(ProviderId::Lifi, Behavior::Hang),
            MockProvider::new(ProviderId::Mayan, Behavior::Ok),
        ]);

        let (results, diagnostics) = aggregator
            .aggregate_with_diagnostics(&SnapshotRequest::listing_only(), None)
            .await;

        let results = results.unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results.contains_key(&ProviderId::Lifi));
        assert!(matches!(
            diagnostics.get(ProviderId::Lifi).unwrap().outcome,
            ProviderOutcome::TimedOut { .. }
        ));
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let aggregator = aggregator(vec![
            MockProvider::new(ProviderId::Cbridge, Behavior::Panic),
            MockProvider::new(ProviderId::Debridge, Behavior::Ok),
        ]);

        let (results, diagnostics) = aggregator
            .aggregate_with_diagnostics(&SnapshotRequest::listing_only(), None)
            .await;

        assert_eq!(results.unwrap().len(), 1);
        match &diagnostics.get(ProviderId::Cbridge).unwrap().outcome {
            ProviderOutcome::Panicked { message } => {
                assert!(message.contains("blew up"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_eager_panic_is_recorded() {
        let providers: Vec<Arc<dyn SnapshotProvider>> = vec![
            Arc::new(EagerPanic) as Arc<dyn SnapshotProvider>,
            MockProvider::new(ProviderId::Wormhole, Behavior::Ok) as Arc<dyn SnapshotProvider>,
        ];
        let aggregator = Aggregator::new(providers);

        let (results, diagnostics) = aggregator
            .aggregate_with_diagnostics(&SnapshotRequest::listing_only(), None)
            .await;

        assert_eq!(results.unwrap().len(), 1);
        match &diagnostics.get(ProviderId::Axelar).unwrap().outcome {
            ProviderOutcome::Panicked { message } => assert!(message.contains("no future")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_join_failure_outcome() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { panic!("task exploded") });
        tasks.spawn(std::future::pending::<()>());

        let error = tasks.join_next().await.unwrap().unwrap_err();
        match join_failure(error) {
            ProviderOutcome::Panicked { message } => assert_eq!(message, "task exploded"),
            other => panic!("unexpected outcome: {:?}", other),
        }

        tasks.abort_all();
        let error = tasks.join_next().await.unwrap().unwrap_err();
        assert!(matches!(join_failure(error), ProviderOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_rejected() {
        let aggregator = aggregator(vec![
            MockProvider::new(ProviderId::Axelar, Behavior::Malformed),
            MockProvider::new(ProviderId::Wormhole, Behavior::Ok),
        ]);

        let (results, diagnostics) = aggregator
            .aggregate_with_diagnostics(&SnapshotRequest::listing_only(), None)
            .await;

        assert_eq!(
            results.unwrap().keys().copied().collect::<Vec<_>>(),
            vec![ProviderId::Wormhole]
        );
        assert!(matches!(
            diagnostics.get(ProviderId::Axelar).unwrap().outcome,
            ProviderOutcome::Rejected { .. }
        ));
    }

    #[tokio::test]
    async fn test_filter_selects_subset() {
        let across = MockProvider::new(ProviderId::Across, Behavior::Ok);
        let relay = MockProvider::new(ProviderId::Relay, Behavior::Ok);
        let aggregator = aggregator(vec![across.clone(), relay.clone()]);

        let (results, diagnostics) = aggregator
            .aggregate_with_diagnostics(
                &SnapshotRequest::listing_only(),
                Some(&[ProviderId::Relay, ProviderId::Stargate]),
            )
            .await;

        assert_eq!(results.unwrap().len(), 1);
        assert_eq!(across.call_count.load(Ordering::SeqCst), 0);
        assert_eq!(relay.call_count.load(Ordering::SeqCst), 1);
        assert_eq!(
            diagnostics.get(ProviderId::Across).unwrap().outcome,
            ProviderOutcome::NotSelected
        );
    }

    #[tokio::test]
    async fn test_unmatched_filter_is_configuration_error() {
        let aggregator = aggregator(vec![MockProvider::new(ProviderId::Across, Behavior::Ok)]);

        let result = aggregator
            .aggregate(
                &SnapshotRequest::listing_only(),
                Some(&[ProviderId::NearIntents]),
            )
            .await;

        assert!(matches!(result, Err(MarketDataError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_empty_registry_is_configuration_error() {
        let aggregator = Aggregator::new(Vec::new());
        let result = aggregator
            .aggregate(&SnapshotRequest::listing_only(), None)
            .await;
        assert!(matches!(result, Err(MarketDataError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_invalid_notional_is_rejected_before_fan_out() {
        let across = MockProvider::new(ProviderId::Across, Behavior::Ok);
        let aggregator = aggregator(vec![across.clone()]);
        let request = SnapshotRequest {
            notionals: vec!["0".to_string()],
            ..SnapshotRequest::default()
        };

        let result = aggregator.aggregate(&request, None).await;

        assert!(matches!(result, Err(MarketDataError::InvalidRequest(_))));
        assert_eq!(across.call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unusable_routes_are_dropped() {
        let across = MockProvider::new(ProviderId::Across, Behavior::Ok);
        let aggregator = aggregator(vec![across.clone()]);

        let mut broken = eth();
        broken.asset_id = "1cs_v1:eth".to_string();
        let usdc = Asset::from_contract(default_codec(), "base", Some("0x8335"), "USDC", 6);
        let request = SnapshotRequest {
            routes: vec![Route::new(eth(), usdc.clone()), Route::new(broken, usdc)],
            notionals: vec!["1000000000000000000".to_string()],
            include_windows: Vec::new(),
        };

        let results = aggregator.aggregate(&request, None).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(across.routes_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let first = MockProvider::new(ProviderId::Across, Behavior::Ok);
        let second = MockProvider::new(ProviderId::Across, Behavior::Fail);
        let aggregator = aggregator(vec![first, second]);
        assert_eq!(aggregator.provider_ids(), vec![ProviderId::Across]);
    }
}
