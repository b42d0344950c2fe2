//! Liquidity depth probing.
//!
//! Discovers, per slippage threshold, the largest input amount a route
//! absorbs by binary search over live quotes:
//!
//! ```text
//!  low ─────────── mid ─────────── high
//!   │               │
//!   │   quote(mid): slippage <= threshold ?  yes -> low = mid, best = mid
//!   │                                         no  -> high = mid
//!   └── reference quote at the lower bound fixes the zero-slippage rate
//! ```
//!
//! The search stops at `max_iterations` or when `(high - low) / low` drops
//! below the convergence tolerance. Each threshold runs its own search.
//! Quote failures count as "too large"; a source with non-monotonic
//! slippage yields the best amount observed, never an error.
//!
//! Probing a route is bounded by a wall-clock budget. A threshold whose
//! search is still running at the deadline is omitted, as are the
//! thresholds after it.

mod slippage;

pub use slippage::slippage_bps;

use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout_at, Instant};

use crate::models::{Asset, LiquidityDepth, LiquidityDepthPoint, Route};
use crate::normalizer::rate_of;
use crate::provider::QuoteSource;

/// Binary-search settings for liquidity probing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbeConfig {
    /// Slippage bounds to search for, in basis points.
    pub thresholds_bps: Vec<u32>,
    /// Lower search bound, in whole source-asset units.
    pub min_units: u64,
    /// Upper search bound, in whole source-asset units.
    pub max_units: u64,
    /// Hard cap on probes per threshold (reference quote excluded).
    pub max_iterations: u32,
    /// Stop once `(high - low) / low` is below this many basis points.
    pub convergence_bps: u32,
    /// Wall-clock budget for probing, in milliseconds.
    pub budget_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            thresholds_bps: vec![50, 100],
            min_units: 1,
            max_units: 10_000_000,
            max_iterations: 12,
            convergence_bps: 1_000,
            budget_ms: 10_000,
        }
    }
}

/// Runs liquidity searches against a [`QuoteSource`].
#[derive(Clone, Debug, Default)]
pub struct DepthProber {
    config: ProbeConfig,
}

impl DepthProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.config.budget_ms)
    }

    /// Same prober with the budget capped at `limit`.
    pub fn capped(&self, limit: Duration) -> Self {
        let mut config = self.config.clone();
        let limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        config.budget_ms = config.budget_ms.min(limit_ms);
        Self { config }
    }

    /// Search bounds in base units of `asset`, or `None` when they cannot be
    /// represented or are empty.
    pub fn bounds_for(&self, asset: &Asset) -> Option<(u128, u128)> {
        let scale = 10u128.checked_pow(asset.decimals)?;
        let low = scale.checked_mul(u128::from(self.config.min_units))?;
        let high = scale.checked_mul(u128::from(self.config.max_units))?;
        (low > 0 && high > low).then_some((low, high))
    }

    /// Probe every configured threshold for `route` within the budget.
    ///
    /// Thresholds whose search could not start (no reference quote) are
    /// omitted. The returned depth is monotonic.
    pub async fn probe_depth<Q>(&self, source: &Q, route: &Route) -> LiquidityDepth
    where
        Q: QuoteSource + ?Sized,
    {
        self.probe_depth_until(source, route, Instant::now() + self.budget())
            .await
    }

    /// Like [`probe_depth`](Self::probe_depth), with an explicit deadline
    /// shared across routes.
    pub async fn probe_depth_until<Q>(
        &self,
        source: &Q,
        route: &Route,
        deadline: Instant,
    ) -> LiquidityDepth
    where
        Q: QuoteSource + ?Sized,
    {
        let mut points = Vec::with_capacity(self.config.thresholds_bps.len());
        for &threshold in &self.config.thresholds_bps {
            match timeout_at(deadline, self.probe_threshold(source, route, threshold)).await {
                Ok(Some(amount)) => points.push(LiquidityDepthPoint {
                    max_amount_in: amount.to_string(),
                    slippage_bps: threshold,
                }),
                Ok(None) => {}
                Err(_) => {
                    warn!(
                        "Probe budget exhausted for {} -> {} at {} bps",
                        route.source.asset_id, route.destination.asset_id, threshold
                    );
                    break;
                }
            }
        }
        LiquidityDepth::new(route.clone(), points, Utc::now())
    }

    /// Largest amount observed within `threshold_bps` of slippage.
    ///
    /// Returns `None` if the bounds are unusable or the reference quote at the
    /// lower bound fails.
    pub async fn probe_threshold<Q>(
        &self,
        source: &Q,
        route: &Route,
        threshold_bps: u32,
    ) -> Option<u128>
    where
        Q: QuoteSource + ?Sized,
    {
        let Some((mut low, mut high)) = self.bounds_for(&route.source) else {
            debug!(
                "No probe bounds for {} ({} decimals)",
                route.source.asset_id, route.source.decimals
            );
            return None;
        };

        let reference = match source.quote(route, &low.to_string()).await {
            Ok(rate) => match rate_of(&rate) {
                Ok(value) if value > Decimal::ZERO => value,
                Ok(_) | Err(_) => {
                    debug!("Unusable reference quote for {}", route.source.asset_id);
                    return None;
                }
            },
            Err(e) => {
                debug!(
                    "Reference quote failed for {} -> {}: {}",
                    route.source.asset_id, route.destination.asset_id, e
                );
                return None;
            }
        };

        let threshold = Decimal::from(threshold_bps);
        let mut best = low;

        for iteration in 0..self.config.max_iterations {
            if self.converged(low, high) {
                debug!("Probe converged after {} iterations", iteration);
                break;
            }

            let mid = low + (high - low) / 2;
            if mid == low {
                break;
            }

            let within = match source.quote(route, &mid.to_string()).await {
                Ok(rate) => rate_of(&rate)
                    .ok()
                    .and_then(|observed| slippage_bps(reference, observed))
                    .is_some_and(|bps| bps <= threshold),
                Err(e) => {
                    debug!("Probe quote at {} failed: {}", mid, e);
                    false
                }
            };

            if within {
                low = mid;
                best = best.max(mid);
            } else {
                high = mid;
            }
        }

        Some(best)
    }

    fn converged(&self, low: u128, high: u128) -> bool {
        let gap = high.saturating_sub(low);
        gap.saturating_mul(10_000) < low.saturating_mul(u128::from(self.config.convergence_bps))
    }
}
