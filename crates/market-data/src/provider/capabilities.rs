//! Provider capabilities and timeout configuration.
//!
//! This module defines structures for describing what a data source
//! can report and how long the aggregator waits for it.

use std::time::Duration;

use crate::models::TimeWindow;

/// Default per-call deadline for a provider.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Describes the capabilities of a data provider.
///
/// Used by the snapshot validator to strip data a provider claims not to
/// produce, and by callers to tell "not supported" from "nothing found".
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Whether the provider quotes rates per route × notional.
    pub supports_rates: bool,

    /// Whether the provider reports slippage-bounded liquidity depth.
    pub supports_liquidity: bool,

    /// Volume windows the provider can compute. Empty means no volume API.
    pub volume_windows: &'static [TimeWindow],
}

impl ProviderCapabilities {
    /// Everything the wire contract can carry.
    pub fn full() -> Self {
        Self {
            supports_rates: true,
            supports_liquidity: true,
            volume_windows: TimeWindow::ALL,
        }
    }

    /// Listing (and optionally volume) only.
    pub fn listing_only() -> Self {
        Self {
            supports_rates: false,
            supports_liquidity: false,
            volume_windows: &[],
        }
    }

    pub fn supports_window(&self, window: TimeWindow) -> bool {
        self.volume_windows.contains(&window)
    }
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self::full()
    }
}
