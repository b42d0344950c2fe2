//! Encoding and decoding of canonical asset ids.

use std::fmt;

use crate::errors::MarketDataError;

use super::chains::ChainAliases;
use super::namespaces::NamespaceTable;

/// Prefix of every canonical asset id.
pub const ASSET_ID_PREFIX: &str = "1cs_v1";

/// Reference used for a chain's native coin.
pub const NATIVE_REFERENCE: &str = "coin";

/// The three components of a canonical asset id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecodedAssetId {
    /// Canonical short chain slug
    pub chain: String,
    pub namespace: String,
    /// Contract address, or "coin"
    pub reference: String,
}

impl DecodedAssetId {
    pub fn is_native(&self) -> bool {
        self.reference == NATIVE_REFERENCE
    }
}

impl fmt::Display for DecodedAssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            ASSET_ID_PREFIX, self.chain, self.namespace, self.reference
        )
    }
}

/// Canonical asset id codec.
///
/// Ids have the form `1cs_v1:<chain-slug>:<namespace>:<reference>`. Encoding
/// is pure: the chain is canonicalized through [`ChainAliases`], the namespace
/// inferred through [`NamespaceTable`].
///
/// # Example
///
/// ```
/// use bridgeview_market_data::asset_id::AssetIdCodec;
///
/// let codec = AssetIdCodec::new();
/// let id = codec.encode("ethereum", Some("0xdac17f958d2ee523a2206206994597c13d831ec7"));
/// assert_eq!(id, "1cs_v1:eth:erc20:0xdac17f958d2ee523a2206206994597c13d831ec7");
///
/// let decoded = codec.decode(&id).unwrap();
/// assert_eq!(decoded.chain, "eth");
/// assert_eq!(decoded.namespace, "erc20");
/// ```
pub struct AssetIdCodec {
    chains: ChainAliases,
    namespaces: NamespaceTable,
}

impl Default for AssetIdCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetIdCodec {
    /// Codec over the default chain and namespace tables.
    pub fn new() -> Self {
        Self::with_tables(ChainAliases::new(), NamespaceTable::new())
    }

    pub fn with_tables(chains: ChainAliases, namespaces: NamespaceTable) -> Self {
        Self { chains, namespaces }
    }

    pub fn chains(&self) -> &ChainAliases {
        &self.chains
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// Namespace for an asset on `chain` (slug, alias or platform id).
    pub fn namespace_for(&self, chain: &str, has_address: bool) -> &'static str {
        let slug = self.chains.short_slug(chain);
        self.namespaces.rule(slug).select(has_address)
    }

    /// Encode a chain and optional contract address into a canonical id.
    ///
    /// An empty address is treated as the native coin.
    pub fn encode(&self, chain: &str, contract_address: Option<&str>) -> String {
        self.components(chain, contract_address).to_string()
    }

    /// The components [`encode`](Self::encode) would produce. Chain names
    /// are lower-cased first.
    pub fn components(&self, chain: &str, contract_address: Option<&str>) -> DecodedAssetId {
        let address = contract_address.filter(|a| !a.is_empty());
        let chain = chain.to_ascii_lowercase();
        let slug = self.chains.short_slug(&chain);

        DecodedAssetId {
            chain: slug.to_string(),
            namespace: self.namespace_for(slug, address.is_some()).to_string(),
            reference: address.unwrap_or(NATIVE_REFERENCE).to_string(),
        }
    }

    /// Decode a canonical id.
    ///
    /// The chain segment is canonicalized to its short slug. Returns
    /// [`MarketDataError::Parse`] when the input does not match the grammar.
    pub fn decode(&self, asset_id: &str) -> Result<DecodedAssetId, MarketDataError> {
        let mut parts = asset_id.splitn(4, ':');

        let prefix = parts.next().unwrap_or_default();
        if prefix != ASSET_ID_PREFIX {
            return Err(MarketDataError::parse(
                asset_id,
                format!("expected prefix '{}'", ASSET_ID_PREFIX),
            ));
        }

        let (chain, namespace, reference) = match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(n), Some(r)) => (c, n, r),
            _ => {
                return Err(MarketDataError::parse(
                    asset_id,
                    "expected <chain>:<namespace>:<reference>",
                ))
            }
        };

        if !is_segment(chain) {
            return Err(MarketDataError::parse(asset_id, "invalid chain segment"));
        }
        if !is_segment(namespace) {
            return Err(MarketDataError::parse(asset_id, "invalid namespace segment"));
        }
        if reference.is_empty() || reference.chars().any(char::is_whitespace) {
            return Err(MarketDataError::parse(asset_id, "invalid reference segment"));
        }

        Ok(DecodedAssetId {
            chain: self.chains.short_slug(chain).to_string(),
            namespace: namespace.to_string(),
            reference: reference.to_string(),
        })
    }
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}
