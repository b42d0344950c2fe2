use serde::{Deserialize, Serialize};

use crate::asset_id::{AssetIdCodec, DecodedAssetId, NATIVE_REFERENCE};
use crate::errors::MarketDataError;

/// A token on a specific chain, identified by its canonical asset id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Canonical id, `1cs_v1:<chain>:<namespace>:<reference>`
    pub asset_id: String,

    /// Canonical short chain slug (e.g. "eth", "arb", "sol")
    pub blockchain: String,

    /// EVM chain id, when the chain has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Asset standard tag (e.g. "erc20", "native", "spl", "nep141")
    pub namespace: String,

    /// Contract address, or "coin" for the chain's native asset
    pub reference: String,

    pub symbol: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub decimals: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// Last known USD price, if the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Asset {
    /// Build an asset from a chain (platform id or alias) and an optional
    /// contract address. The id, slug, namespace and reference are derived
    /// through the codec.
    pub fn from_contract(
        codec: &AssetIdCodec,
        chain: &str,
        contract_address: Option<&str>,
        symbol: impl Into<String>,
        decimals: u32,
    ) -> Self {
        let decoded = codec.components(chain, contract_address);
        Self::from_decoded(codec, decoded, symbol.into(), decimals)
    }

    /// Build an asset from an existing canonical id.
    pub fn from_asset_id(
        codec: &AssetIdCodec,
        asset_id: &str,
        symbol: impl Into<String>,
        decimals: u32,
    ) -> Result<Self, MarketDataError> {
        let decoded = codec.decode(asset_id)?;
        Ok(Self::from_decoded(codec, decoded, symbol.into(), decimals))
    }

    fn from_decoded(
        codec: &AssetIdCodec,
        decoded: DecodedAssetId,
        symbol: String,
        decimals: u32,
    ) -> Self {
        Self {
            asset_id: decoded.to_string(),
            chain_id: codec.chains().chain_id(&decoded.chain),
            blockchain: decoded.chain,
            namespace: decoded.namespace,
            reference: decoded.reference,
            symbol,
            name: None,
            decimals,
            icon_url: None,
            price: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Whether this is the chain's native coin.
    pub fn is_native(&self) -> bool {
        self.reference == NATIVE_REFERENCE
    }

    /// Check that `asset_id` decodes and agrees with the chain/namespace/reference fields.
    pub fn verify_identity(&self, codec: &AssetIdCodec) -> Result<(), MarketDataError> {
        let decoded = codec.decode(&self.asset_id)?;
        let expected = DecodedAssetId {
            chain: codec.chains().short_slug(&self.blockchain).to_string(),
            namespace: self.namespace.clone(),
            reference: self.reference.clone(),
        };
        if decoded != expected {
            return Err(MarketDataError::parse(
                &self.asset_id,
                format!("does not match asset fields ({})", expected),
            ));
        }
        Ok(())
    }
}

/// A directed source → destination pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub source: Asset,
    pub destination: Asset,
}

impl Route {
    pub fn new(source: Asset, destination: Asset) -> Self {
        Self {
            source,
            destination,
        }
    }
}
