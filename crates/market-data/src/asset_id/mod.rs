//! Canonical asset identity.
//!
//! Assets from different chains and token standards are compared through a
//! single string key:
//!
//! ```text
//! 1cs_v1:<chain-slug>:<namespace>:<reference>
//!        │            │           └── contract address, or "coin"
//!        │            └── asset standard (erc20, native, spl, nep141, ...)
//!        └── shortest alias of the chain's platform id (eth, arb, sol, ...)
//! ```
//!
//! - [`ChainAliases`] - platform id <-> alias table, EVM chain ids
//! - [`NamespaceTable`] - per-chain namespaces for non-EVM chains
//! - [`AssetIdCodec`] - encode/decode over both tables
//!
//! [`encode`] and [`decode`] use a shared codec built from the default tables.

mod chains;
mod codec;
mod namespaces;

pub use chains::{ChainAliases, ChainInfo};
pub use codec::{AssetIdCodec, DecodedAssetId, ASSET_ID_PREFIX, NATIVE_REFERENCE};
pub use namespaces::{NamespaceRule, NamespaceTable, EVM_TOKEN_NAMESPACE, NATIVE_NAMESPACE};

use lazy_static::lazy_static;

use crate::errors::MarketDataError;

lazy_static! {
    static ref DEFAULT_CODEC: AssetIdCodec = AssetIdCodec::new();
}

/// The shared default codec.
pub fn default_codec() -> &'static AssetIdCodec {
    &DEFAULT_CODEC
}

/// Encode with the default tables. See [`AssetIdCodec::encode`].
pub fn encode(chain: &str, contract_address: Option<&str>) -> String {
    DEFAULT_CODEC.encode(chain, contract_address)
}

/// Decode with the default tables. See [`AssetIdCodec::decode`].
pub fn decode(asset_id: &str) -> Result<DecodedAssetId, MarketDataError> {
    DEFAULT_CODEC.decode(asset_id)
}
