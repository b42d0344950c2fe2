//! Asset-standard namespaces per chain.
//!
//! EVM chains follow a fixed rule (`erc20` for contracts, `native` for the
//! coin). Every non-EVM chain in the alias table has an explicit entry; an
//! unrecognized chain falls back to the EVM rule.

use std::collections::HashMap;

use super::chains::ChainAliases;

pub const EVM_TOKEN_NAMESPACE: &str = "erc20";
pub const NATIVE_NAMESPACE: &str = "native";

/// Namespaces used on one chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamespaceRule {
    /// Namespace for contract/token assets.
    pub token: &'static str,
    /// Namespace for the chain's own coin.
    pub native: &'static str,
}

impl NamespaceRule {
    pub const EVM: NamespaceRule = NamespaceRule {
        token: EVM_TOKEN_NAMESPACE,
        native: NATIVE_NAMESPACE,
    };

    /// Chains that only carry their own coin.
    pub const NATIVE_ONLY: NamespaceRule = NamespaceRule {
        token: NATIVE_NAMESPACE,
        native: NATIVE_NAMESPACE,
    };

    pub fn select(&self, has_address: bool) -> &'static str {
        if has_address {
            self.token
        } else {
            self.native
        }
    }
}

/// Short slug -> namespace rule for non-EVM chains.
pub struct NamespaceTable {
    rules: HashMap<&'static str, NamespaceRule>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTable {
    pub fn new() -> Self {
        let mut table = Self {
            rules: HashMap::new(),
        };
        table.load_defaults();
        table
    }

    fn load_defaults(&mut self) {
        self.add("sol", "spl", NATIVE_NAMESPACE);
        self.add("near", "nep141", NATIVE_NAMESPACE);
        self.add("tron", "trc20", NATIVE_NAMESPACE);
        self.add("ton", "jetton", NATIVE_NAMESPACE);
        self.add("sui", "coin", NATIVE_NAMESPACE);
        self.add("apt", "fa", NATIVE_NAMESPACE);

        for slug in ["btc", "doge", "ltc", "bch", "zec", "xrp"] {
            self.rules.insert(slug, NamespaceRule::NATIVE_ONLY);
        }
    }

    pub fn add(&mut self, slug: &'static str, token: &'static str, native: &'static str) {
        self.rules.insert(slug, NamespaceRule { token, native });
    }

    /// Rule for a short slug; EVM rule when there is no explicit entry.
    pub fn rule(&self, slug: &str) -> NamespaceRule {
        self.rules.get(slug).copied().unwrap_or(NamespaceRule::EVM)
    }

    pub fn has_rule(&self, slug: &str) -> bool {
        self.rules.contains_key(slug)
    }

    /// Non-EVM chains in `chains` that have no explicit rule.
    pub fn missing_rules<'a>(&self, chains: &'a ChainAliases) -> Vec<&'a str> {
        chains
            .iter()
            .filter(|info| !info.is_evm() && !self.has_rule(info.short_slug()))
            .map(|info| info.platform)
            .collect()
    }
}
