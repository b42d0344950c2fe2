//! Error types and failure-scope classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`FailureScope`]: How far a failure is allowed to propagate

mod scope;

pub use scope::FailureScope;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`FailureScope`] via the
/// [`scope`](Self::scope) method, which determines where the aggregation
/// pipeline absorbs the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A canonical asset id did not match `1cs_v1:<chain>:<namespace>:<reference>`.
    /// The asset is unusable for the current request; nothing else is affected.
    #[error("Invalid asset id '{input}': {reason}")]
    Parse {
        /// The rejected input
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// A rate could not be computed from the given amounts/decimals.
    /// The rate is left out of the provider's `rates` array.
    #[error("Invalid rate input: {0}")]
    InvalidRateInput(String),

    /// The provider understood the request but has no data for a capability.
    /// Represented as an empty array in the snapshot.
    #[error("No {capability} data from {provider}")]
    DataUnavailable {
        /// The provider without data
        provider: String,
        /// The capability (e.g. "volume")
        capability: String,
    },

    /// The provider could not be reached or answered with something unusable.
    #[error("Provider unavailable: {provider} - {message}")]
    ProviderUnavailable {
        /// The failing provider
        provider: String,
        /// Upstream error message
        message: String,
    },

    /// The provider call exceeded its deadline.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// Snapshot validation failed.
    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The aggregation was asked to run over zero resolvable providers,
    /// or the provider configuration itself is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The top-level request is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the failure scope for this error.
    ///
    /// - [`FailureScope::Item`]: drop the single asset/rate/threshold
    /// - [`FailureScope::Provider`]: drop the provider from this cycle
    /// - [`FailureScope::Fatal`]: fail the whole aggregation
    ///
    /// # Examples
    ///
    /// ```
    /// use bridgeview_market_data::errors::{FailureScope, MarketDataError};
    ///
    /// let error = MarketDataError::Timeout { provider: "across".to_string() };
    /// assert_eq!(error.scope(), FailureScope::Provider);
    ///
    /// let error = MarketDataError::Configuration("no providers".to_string());
    /// assert_eq!(error.scope(), FailureScope::Fatal);
    /// ```
    pub fn scope(&self) -> FailureScope {
        match self {
            Self::Parse { .. } | Self::InvalidRateInput(_) | Self::DataUnavailable { .. } => {
                FailureScope::Item
            }

            Self::ProviderUnavailable { .. }
            | Self::Timeout { .. }
            | Self::ValidationFailed { .. }
            | Self::Network(_) => FailureScope::Provider,

            Self::Configuration(_) | Self::InvalidRequest(_) => FailureScope::Fatal,
        }
    }

    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(provider: impl ToString, message: impl ToString) -> Self {
        Self::ProviderUnavailable {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }
}
