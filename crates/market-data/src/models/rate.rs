use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Asset;

/// A quoted conversion between two assets for a given input amount.
///
/// `amount_in`/`amount_out` are raw integer strings in base units.
/// `effective_rate` is derived from them by the normalizer, never parsed
/// from floats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub source: Asset,
    pub destination: Asset,
    pub amount_in: String,
    pub amount_out: String,
    pub effective_rate: f64,
    pub total_fees_usd: Option<f64>,
    pub quoted_at: DateTime<Utc>,
}
