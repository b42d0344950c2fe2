//! Provider trait definitions.
//!
//! This module defines the [`SnapshotProvider`] trait every data source
//! implements, and the [`QuoteSource`] capability the liquidity prober
//! drives.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{ProviderId, Rate, Route, Snapshot, SnapshotRequest};

use super::capabilities::{ProviderCapabilities, DEFAULT_PROVIDER_TIMEOUT};

/// Trait for bridge/exchange data providers.
///
/// Implement this trait to add support for a new data source. The
/// aggregator treats every implementation the same, whatever backs it
/// (REST API, on-chain query, cached index).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use bridgeview_market_data::provider::{ProviderCapabilities, SnapshotProvider};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl SnapshotProvider for MyProvider {
///     fn id(&self) -> ProviderId {
///         ProviderId::Relay
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities::listing_only()
///     }
///
///     async fn get_snapshot(&self, request: &SnapshotRequest) -> Result<Snapshot, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Unique identifier for this provider.
    fn id(&self) -> ProviderId;

    /// Describes what this provider can report.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Deadline for one `get_snapshot` call.
    ///
    /// The aggregator may cap this with its own configured maximum.
    fn timeout(&self) -> Duration {
        DEFAULT_PROVIDER_TIMEOUT
    }

    /// Produce this provider's snapshot for the request.
    ///
    /// # Arguments
    ///
    /// * `request` - Routes (possibly empty), notionals and volume windows
    ///
    /// # Returns
    ///
    /// The snapshot on success. `volumes` and `listed_assets` must be present
    /// even when empty; `rates`/`liquidity` are `None` when unsupported.
    /// Windows the provider cannot compute are ignored, not errors.
    async fn get_snapshot(&self, request: &SnapshotRequest) -> Result<Snapshot, MarketDataError>;
}

/// A source of single quotes, as consumed by the liquidity prober.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Quote `amount_in` (raw integer string, source base units) along `route`.
    async fn quote(&self, route: &Route, amount_in: &str) -> Result<Rate, MarketDataError>;
}
