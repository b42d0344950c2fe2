use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Route;
use super::liquidity::LiquidityDepth;
use super::listing::ListedAssets;
use super::rate::Rate;
use super::types::ProviderId;
use super::volume::{TimeWindow, VolumeWindow};
use crate::errors::MarketDataError;

/// What a caller asks every provider for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    /// Routes to quote; empty for a listing-only query
    #[serde(default)]
    pub routes: Vec<Route>,

    /// Raw integer-string input amounts, one rate per route × notional
    #[serde(default)]
    pub notionals: Vec<String>,

    /// Volume windows to compute; empty means all windows
    #[serde(default)]
    pub include_windows: Vec<TimeWindow>,
}

impl SnapshotRequest {
    /// A request that only asks for listed assets and volumes.
    pub fn listing_only() -> Self {
        Self::default()
    }

    /// Whether the caller wants volume for `window`.
    pub fn wants_window(&self, window: TimeWindow) -> bool {
        self.include_windows.is_empty() || self.include_windows.contains(&window)
    }

    /// Check the top-level request shape.
    ///
    /// Every notional must be a positive integer string. Asset ids inside
    /// routes are not checked here; unusable routes are dropped per route.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        for notional in &self.notionals {
            let is_digits = !notional.is_empty() && notional.bytes().all(|b| b.is_ascii_digit());
            if !is_digits {
                return Err(MarketDataError::InvalidRequest(format!(
                    "notional '{}' is not an integer amount",
                    notional
                )));
            }
            if notional.bytes().all(|b| b == b'0') {
                return Err(MarketDataError::InvalidRequest(format!(
                    "notional '{}' must be greater than zero",
                    notional
                )));
            }
        }
        Ok(())
    }
}

/// One provider's complete answer to a [`SnapshotRequest`].
///
/// `volumes` and `listed_assets` are always present (empty means "checked,
/// found nothing"); `rates`/`liquidity` are `None` when the provider does not
/// support the capability at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub volumes: Vec<VolumeWindow>,
    pub listed_assets: ListedAssets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<Vec<Rate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<Vec<LiquidityDepth>>,
}

impl Snapshot {
    /// An empty snapshot with no rate/liquidity capability.
    pub fn empty(measured_at: DateTime<Utc>) -> Self {
        Self {
            volumes: Vec::new(),
            listed_assets: ListedAssets::empty(measured_at),
            rates: None,
            liquidity: None,
        }
    }
}

/// Successful snapshots of one aggregation, sorted by provider id.
pub type AggregatedSnapshots = BTreeMap<ProviderId, Snapshot>;
