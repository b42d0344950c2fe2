//! Cross-provider grouping of listed assets by display symbol.
//!
//! Groups are keyed by the upper-cased symbol and index each asset by
//! `(provider, blockchain)`, where `blockchain` is the canonical short slug
//! so platform ids and aliases land in one slot. The first asset seen for a
//! slot wins. Display
//! metadata (icon, price) is seeded by the first asset that has it and is
//! never overwritten afterwards.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::asset_id::default_codec;
use crate::models::{AggregatedSnapshots, Asset, ListedAssets, ProviderId};

/// An asset as listed by one provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAsset {
    pub provider_id: ProviderId,
    pub asset: Asset,
}

/// Every listing of one symbol across providers and chains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolGroup {
    /// Upper-cased symbol
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// provider → blockchain → asset
    pub providers: BTreeMap<ProviderId, BTreeMap<String, ProviderAsset>>,
    pub all_blockchains: Vec<String>,
    pub all_providers: Vec<ProviderId>,
}

impl SymbolGroup {
    fn new(symbol: String) -> Self {
        Self {
            symbol,
            icon_url: None,
            price: None,
            providers: BTreeMap::new(),
            all_blockchains: Vec::new(),
            all_providers: Vec::new(),
        }
    }

    /// Blockchains on which `provider` lists this symbol, sorted.
    pub fn blockchains_for(&self, provider: ProviderId) -> Vec<&str> {
        self.providers
            .get(&provider)
            .map(|chains| chains.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The asset `provider` lists on `blockchain`, if any.
    pub fn asset(&self, provider: ProviderId, blockchain: &str) -> Option<&Asset> {
        self.providers
            .get(&provider)
            .and_then(|chains| chains.get(blockchain))
            .map(|entry| &entry.asset)
    }

    fn insert(&mut self, provider_id: ProviderId, asset: &Asset) {
        if self.icon_url.is_none() {
            self.icon_url = asset.icon_url.clone();
        }
        if self.price.is_none() {
            self.price = asset.price.filter(|p| p.is_finite());
        }

        let blockchain = default_codec().chains().short_slug(&asset.blockchain);
        self.providers
            .entry(provider_id)
            .or_default()
            .entry(blockchain.to_string())
            .or_insert_with(|| ProviderAsset {
                provider_id,
                asset: asset.clone(),
            });
    }

    fn refresh_unions(&mut self) {
        let chains: BTreeSet<&String> = self.providers.values().flat_map(|c| c.keys()).collect();
        self.all_blockchains = chains.into_iter().cloned().collect();
        self.all_providers = self.providers.keys().copied().collect();
    }
}

/// Whether two providers list a symbol on one blockchain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAvailability {
    pub blockchain: String,
    pub in_first: bool,
    pub in_second: bool,
    pub shared: bool,
}

/// Accumulates listings into symbol groups.
#[derive(Debug, Default)]
pub struct SymbolGrouper {
    groups: BTreeMap<String, SymbolGroup>,
}

impl SymbolGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one provider's listing. Earlier additions take precedence.
    pub fn add(&mut self, provider_id: ProviderId, listing: &ListedAssets) {
        for asset in &listing.assets {
            let key = asset.symbol.trim().to_uppercase();
            if key.is_empty() {
                debug!("Skipping {} from {}: empty symbol", asset.asset_id, provider_id);
                continue;
            }
            self.groups
                .entry(key.clone())
                .or_insert_with(|| SymbolGroup::new(key))
                .insert(provider_id, asset);
        }
    }

    /// Finish grouping, returning groups keyed by symbol.
    pub fn finish(mut self) -> BTreeMap<String, SymbolGroup> {
        for group in self.groups.values_mut() {
            group.refresh_unions();
        }
        self.groups
    }

    /// Group listings in the given order.
    pub fn group<'a, I>(listings: I) -> BTreeMap<String, SymbolGroup>
    where
        I: IntoIterator<Item = (ProviderId, &'a ListedAssets)>,
    {
        let mut grouper = Self::new();
        for (provider_id, listing) in listings {
            grouper.add(provider_id, listing);
        }
        grouper.finish()
    }

    /// Group the listed assets of an aggregation, in provider id order.
    pub fn group_snapshots(snapshots: &AggregatedSnapshots) -> BTreeMap<String, SymbolGroup> {
        Self::group(
            snapshots
                .iter()
                .map(|(id, snapshot)| (*id, &snapshot.listed_assets)),
        )
    }
}

/// Per-blockchain availability of `group` on two providers, sorted by
/// blockchain.
pub fn compare_networks(
    group: &SymbolGroup,
    first: ProviderId,
    second: ProviderId,
) -> Vec<NetworkAvailability> {
    let in_first: BTreeSet<&str> = group.blockchains_for(first).into_iter().collect();
    let in_second: BTreeSet<&str> = group.blockchains_for(second).into_iter().collect();

    in_first
        .union(&in_second)
        .map(|blockchain| {
            let a = in_first.contains(blockchain);
            let b = in_second.contains(blockchain);
            NetworkAvailability {
                blockchain: blockchain.to_string(),
                in_first: a,
                in_second: b,
                shared: a && b,
            }
        })
        .collect()
}
