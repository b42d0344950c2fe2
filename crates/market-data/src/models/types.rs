use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Identifier of a bridge/exchange data source.
///
/// The set is closed: configuration and request filters are validated
/// against it, never resolved as free-form strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Across,
    Axelar,
    Cbridge,
    Debridge,
    Lifi,
    Mayan,
    NearIntents,
    Relay,
    Stargate,
    Wormhole,
}

impl ProviderId {
    /// Every known provider id.
    pub const ALL: &'static [ProviderId] = &[
        Self::Across,
        Self::Axelar,
        Self::Cbridge,
        Self::Debridge,
        Self::Lifi,
        Self::Mayan,
        Self::NearIntents,
        Self::Relay,
        Self::Stargate,
        Self::Wormhole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Across => "across",
            Self::Axelar => "axelar",
            Self::Cbridge => "cbridge",
            Self::Debridge => "debridge",
            Self::Lifi => "lifi",
            Self::Mayan => "mayan",
            Self::NearIntents => "near_intents",
            Self::Relay => "relay",
            Self::Stargate => "stargate",
            Self::Wormhole => "wormhole",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| MarketDataError::Configuration(format!("Unknown provider id: {}", s)))
    }
}

// Ordered by wire name so result maps come out alphabetically.
impl Ord for ProviderId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for ProviderId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
