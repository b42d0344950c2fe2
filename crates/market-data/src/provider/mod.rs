//! Snapshot provider abstractions and implementations.
//!
//! This module contains:
//! - The [`SnapshotProvider`] trait every data source implements
//! - The [`QuoteSource`] capability consumed by the liquidity prober
//! - Two REST-backed providers and the settings that build them
//!
//! The aggregator only ever sees `Arc<dyn SnapshotProvider>`; which
//! upstream backs a given [`ProviderId`](crate::models::ProviderId) is a
//! configuration concern.

mod capabilities;
mod config;
pub(crate) mod http;
mod traits;

pub mod quote_api;
pub mod snapshot_api;

pub use capabilities::{ProviderCapabilities, DEFAULT_PROVIDER_TIMEOUT};
pub use config::{build_providers, ProviderKind, ProviderSettings};
pub use traits::{QuoteSource, SnapshotProvider};
