use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Asset;

/// Assets a provider supports, as of `measured_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedAssets {
    pub assets: Vec<Asset>,
    pub measured_at: DateTime<Utc>,
}

impl ListedAssets {
    /// Build a listing, keeping the first entry for each `asset_id`.
    pub fn new(assets: Vec<Asset>, measured_at: DateTime<Utc>) -> Self {
        Self {
            assets: dedup_by_asset_id(assets),
            measured_at,
        }
    }

    pub fn empty(measured_at: DateTime<Utc>) -> Self {
        Self {
            assets: Vec::new(),
            measured_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }
}

pub(crate) fn dedup_by_asset_id(assets: Vec<Asset>) -> Vec<Asset> {
    let mut seen = HashSet::with_capacity(assets.len());
    assets
        .into_iter()
        .filter(|asset| seen.insert(asset.asset_id.clone()))
        .collect()
}
