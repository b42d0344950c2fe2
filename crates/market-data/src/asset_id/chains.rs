//! Chain platform ids and their short aliases.
//!
//! A platform id (e.g. "ethereum", as used by token-list APIs) maps to one or
//! more short aliases ("eth"). The canonical short slug of a chain is its
//! shortest alias; ties go to the alias listed first.

use std::collections::HashMap;

/// Static metadata for one supported chain.
#[derive(Clone, Debug)]
pub struct ChainInfo {
    /// Platform identifier (e.g. "arbitrum-one").
    pub platform: &'static str,
    /// Aliases in table order (e.g. ["arbitrum", "arb"]).
    pub aliases: Vec<&'static str>,
    /// EVM chain id; `None` for non-EVM chains.
    pub evm_chain_id: Option<u64>,
}

impl ChainInfo {
    /// Shortest alias, first one wins on equal length.
    pub fn short_slug(&self) -> &'static str {
        self.aliases
            .iter()
            .copied()
            .fold(None, |best: Option<&'static str>, alias| match best {
                Some(current) if current.len() <= alias.len() => Some(current),
                _ => Some(alias),
            })
            .unwrap_or(self.platform)
    }

    pub fn is_evm(&self) -> bool {
        self.evm_chain_id.is_some()
    }
}

/// Bidirectional platform id <-> alias table.
pub struct ChainAliases {
    chains: Vec<ChainInfo>,
    /// platform id or alias -> index into `chains`
    lookup: HashMap<&'static str, usize>,
}

impl Default for ChainAliases {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainAliases {
    /// Create the table with the default chain set.
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.load_defaults();
        table
    }

    /// An empty table; every id passes through unchanged.
    pub fn empty() -> Self {
        Self {
            chains: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    fn load_defaults(&mut self) {
        // ===== EVM =====
        self.add("ethereum", &["eth"], Some(1));
        self.add("arbitrum-one", &["arbitrum", "arb"], Some(42161));
        self.add("optimistic-ethereum", &["optimism", "op"], Some(10));
        self.add("base", &["base"], Some(8453));
        self.add("polygon-pos", &["polygon", "pol"], Some(137));
        self.add("binance-smart-chain", &["bsc", "bnb"], Some(56));
        self.add("avalanche", &["avax"], Some(43114));
        self.add("xdai", &["gnosis", "gno"], Some(100));
        self.add("berachain", &["bera"], Some(80094));

        // ===== Non-EVM =====
        self.add("solana", &["sol"], None);
        self.add("near-protocol", &["near"], None);
        self.add("tron", &["tron"], None);
        self.add("the-open-network", &["ton"], None);
        self.add("sui", &["sui"], None);
        self.add("aptos", &["aptos", "apt"], None);

        // ===== UTXO / native-only =====
        self.add("bitcoin", &["btc"], None);
        self.add("dogecoin", &["doge"], None);
        self.add("litecoin", &["ltc"], None);
        self.add("bitcoin-cash", &["bch"], None);
        self.add("zcash", &["zec"], None);
        self.add("ripple", &["xrp"], None);
    }

    /// Register a chain. Later registrations never steal an alias that is
    /// already taken.
    pub fn add(
        &mut self,
        platform: &'static str,
        aliases: &[&'static str],
        evm_chain_id: Option<u64>,
    ) {
        let index = self.chains.len();
        self.chains.push(ChainInfo {
            platform,
            aliases: aliases.to_vec(),
            evm_chain_id,
        });
        self.lookup.entry(platform).or_insert(index);
        for &alias in aliases {
            self.lookup.entry(alias).or_insert(index);
        }
    }

    /// Look up a chain by platform id or alias.
    pub fn get(&self, chain: &str) -> Option<&ChainInfo> {
        self.lookup.get(chain).map(|&index| &self.chains[index])
    }

    /// Canonical short slug for a platform id or alias. Unknown ids are
    /// returned unchanged.
    pub fn short_slug<'a>(&self, chain: &'a str) -> &'a str {
        match self.get(chain) {
            Some(info) => info.short_slug(),
            None => chain,
        }
    }

    /// Platform id for a slug or alias. Unknown ids are returned unchanged.
    pub fn platform<'a>(&self, chain: &'a str) -> &'a str {
        match self.get(chain) {
            Some(info) => info.platform,
            None => chain,
        }
    }

    /// EVM chain id, if the chain is a known EVM chain.
    pub fn chain_id(&self, chain: &str) -> Option<u64> {
        self.get(chain).and_then(|info| info.evm_chain_id)
    }

    /// Iterate all registered chains in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainInfo> {
        self.chains.iter()
    }
}
