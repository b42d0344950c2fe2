//! Market data models
//!
//! This module contains the canonical schema every provider is normalized into:
//! - `types` - Provider identifiers (ProviderId)
//! - `asset` - Assets and routes (Asset, Route)
//! - `rate` - Quoted conversions (Rate)
//! - `liquidity` - Slippage-bounded depth (LiquidityDepth, LiquidityDepthPoint)
//! - `volume` - Traded volume per window (TimeWindow, VolumeWindow)
//! - `listing` - Listed assets per provider (ListedAssets)
//! - `snapshot` - Request and per-provider response (SnapshotRequest, Snapshot)

mod asset;
mod liquidity;
mod listing;
mod rate;
mod snapshot;
mod types;
mod volume;

pub use asset::{Asset, Route};
pub use liquidity::{LiquidityDepth, LiquidityDepthPoint};
pub use listing::ListedAssets;
pub use rate::Rate;
pub use snapshot::{AggregatedSnapshots, Snapshot, SnapshotRequest};
pub use types::ProviderId;
pub use volume::{TimeWindow, VolumeWindow};

pub(crate) use liquidity::monotonic as monotonic_thresholds;
pub(crate) use listing::dedup_by_asset_id;
