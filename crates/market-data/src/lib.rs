//! Bridgeview Market Data Crate
//!
//! This crate compares cross-chain bridges and swap venues by fetching a
//! normalized snapshot (rates, liquidity depth, volume, listed assets) from
//! every configured provider concurrently.
//!
//! # Overview
//!
//! The market data crate supports:
//! - A canonical asset id (`1cs_v1:<chain>:<namespace>:<reference>`) shared by all providers
//! - Exact decimal rate normalization over raw integer amounts
//! - Liquidity depth discovery by binary search over live quotes
//! - Concurrent aggregation with per-provider timeouts and failure isolation
//! - Cross-provider grouping of listed assets by symbol
//!
//! # Architecture
//!
//! ```text
//!                          +------------------+
//!                          | SnapshotRequest  |  (routes, notionals, windows)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Aggregator    |  (JoinSet fan-out, timeouts)
//!                          +------------------+
//!                            |     |      |
//!                            v     v      v
//!                          +------------------+
//!                          | SnapshotProvider |  (REST snapshot / quote APIs)
//!                          +------------------+
//!                            |            |
//!                            v            v
//!                 +--------------+  +--------------+
//!                 |  Normalizer  |  | DepthProber  |
//!                 +--------------+  +--------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | SnapshotValidator|  (sanitize or reject)
//!                          +------------------+
//!                                  |
//!                                  v
//!                        +---------------------+
//!                        | AggregatedSnapshots |  --> SymbolGrouper
//!                        +---------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Asset`] - A token on one chain, identified by its canonical id
//! - [`Snapshot`] - One provider's answer to a [`SnapshotRequest`]
//! - [`AggregatedSnapshots`] - Successful snapshots keyed by [`ProviderId`]
//! - [`SymbolGroup`] - Listings of one symbol across providers and chains

pub mod asset_id;
pub mod errors;
pub mod grouping;
pub mod models;
pub mod normalizer;
pub mod prober;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{
    AggregatedSnapshots, Asset, LiquidityDepth, LiquidityDepthPoint, ListedAssets, ProviderId,
    Rate, Route, Snapshot, SnapshotRequest, TimeWindow, VolumeWindow,
};

pub use asset_id::{AssetIdCodec, ChainAliases, DecodedAssetId, NamespaceTable};
pub use errors::{FailureScope, MarketDataError};
pub use grouping::{
    compare_networks, NetworkAvailability, ProviderAsset, SymbolGroup, SymbolGrouper,
};
pub use prober::{DepthProber, ProbeConfig};

// Re-export provider types
pub use provider::quote_api::QuoteApiProvider;
pub use provider::snapshot_api::SnapshotApiProvider;
pub use provider::{
    build_providers, ProviderCapabilities, ProviderKind, ProviderSettings, QuoteSource,
    SnapshotProvider,
};

// Re-export registry types
pub use registry::{
    AggregateDiagnostics, Aggregator, AggregatorConfig, ProviderAttempt, ProviderOutcome,
    SnapshotValidator, ValidationSeverity,
};
