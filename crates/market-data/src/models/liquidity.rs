use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Route;

/// Largest input amount observed to stay within a slippage bound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityDepthPoint {
    /// Raw integer amount in source-asset base units
    pub max_amount_in: String,
    pub slippage_bps: u32,
}

/// Liquidity depth for one route across several slippage thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityDepth {
    pub route: Route,
    pub thresholds: Vec<LiquidityDepthPoint>,
    pub measured_at: DateTime<Utc>,
}

impl LiquidityDepth {
    /// Build a depth record. Thresholds are sorted by `slippage_bps` and
    /// made monotonic: a larger bound never reports a smaller amount.
    pub fn new(
        route: Route,
        thresholds: Vec<LiquidityDepthPoint>,
        measured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            route,
            thresholds: monotonic(thresholds),
            measured_at,
        }
    }

    /// Whether thresholds are sorted and non-decreasing in amount.
    pub fn is_monotonic(&self) -> bool {
        self.thresholds.windows(2).all(|pair| {
            pair[0].slippage_bps <= pair[1].slippage_bps
                && amount(&pair[0].max_amount_in) <= amount(&pair[1].max_amount_in)
        })
    }
}

/// Sort by bps and carry the running maximum amount forward.
///
/// Points whose amount is not an integer string are dropped.
pub(crate) fn monotonic(mut thresholds: Vec<LiquidityDepthPoint>) -> Vec<LiquidityDepthPoint> {
    thresholds.retain(|p| p.max_amount_in.parse::<u128>().is_ok());
    thresholds.sort_by_key(|p| p.slippage_bps);
    thresholds.dedup_by_key(|p| p.slippage_bps);

    let mut running_max = 0u128;
    for point in &mut thresholds {
        let value = amount(&point.max_amount_in);
        if value < running_max {
            point.max_amount_in = running_max.to_string();
        } else {
            running_max = value;
        }
    }
    thresholds
}

fn amount(raw: &str) -> u128 {
    raw.parse().unwrap_or(0)
}
