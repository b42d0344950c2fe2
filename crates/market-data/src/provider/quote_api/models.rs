//! Upstream response shapes for quote-style bridge APIs.

use serde::Deserialize;

/// Response from `GET /tokens`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenListResponse {
    pub tokens: Vec<TokenEntry>,
}

/// One supported token as the upstream describes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenEntry {
    /// Upstream chain name; platform id or any known alias
    pub chain: String,
    /// Contract address; absent or empty for the native coin
    #[serde(default)]
    pub address: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub decimals: u32,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub price_usd: Option<f64>,
}

/// Response from `GET /quote`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteResponse {
    /// Raw output amount in destination base units
    pub amount_out: String,
    #[serde(default)]
    pub fees: Vec<FeeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FeeEntry {
    #[serde(default)]
    pub amount_usd: Option<f64>,
}
