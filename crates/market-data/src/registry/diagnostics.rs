//! Per-provider attempt tracking for aggregation diagnostics.

use std::fmt;
use std::time::Duration;

use crate::models::ProviderId;

/// How one provider's part of an aggregation ended.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderOutcome {
    /// Snapshot accepted into the result map.
    Success,

    /// Registered but left out by the caller's filter.
    NotSelected,

    /// `get_snapshot` returned an error.
    Failed { message: String },

    /// The call exceeded its deadline.
    TimedOut { after: Duration },

    /// The provider task panicked.
    Panicked { message: String },

    /// The snapshot arrived but failed validation.
    Rejected { message: String },
}

impl fmt::Display for ProviderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::NotSelected => write!(f, "SKIPPED (not selected)"),
            Self::Failed { message } => write!(f, "ERROR ({})", message),
            Self::TimedOut { after } => write!(f, "TIMEOUT ({}ms)", after.as_millis()),
            Self::Panicked { message } => write!(f, "PANIC ({})", message),
            Self::Rejected { message } => write!(f, "REJECTED ({})", message),
        }
    }
}

/// Record of a single provider attempt during an aggregation.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub outcome: ProviderOutcome,
    /// Wall time of the call; zero for providers that were not run
    pub elapsed: Duration,
}

impl ProviderAttempt {
    pub fn is_success(&self) -> bool {
        self.outcome == ProviderOutcome::Success
    }
}

/// Everything that happened to each provider in one aggregation.
///
/// Attempts are kept sorted by provider id.
#[derive(Clone, Debug, Default)]
pub struct AggregateDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl AggregateDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record(&mut self, provider_id: ProviderId, outcome: ProviderOutcome, elapsed: Duration) {
        let attempt = ProviderAttempt {
            provider_id,
            outcome,
            elapsed,
        };
        let index = self
            .attempts
            .partition_point(|a| a.provider_id <= provider_id);
        self.attempts.insert(index, attempt);
    }

    pub fn record_skip(&mut self, provider_id: ProviderId) {
        self.record(provider_id, ProviderOutcome::NotSelected, Duration::ZERO);
    }

    /// Summary for logging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| format!("{}: {}", a.provider_id, a.outcome))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(ProviderAttempt::is_success)
    }

    pub fn succeeded(&self) -> Vec<ProviderId> {
        self.attempts
            .iter()
            .filter(|a| a.is_success())
            .map(|a| a.provider_id)
            .collect()
    }

    /// Providers that were run and did not make it into the result.
    pub fn failures(&self) -> Vec<(ProviderId, &ProviderOutcome)> {
        self.attempts
            .iter()
            .filter(|a| !a.is_success() && a.outcome != ProviderOutcome::NotSelected)
            .map(|a| (a.provider_id, &a.outcome))
            .collect()
    }

    pub fn get(&self, provider_id: ProviderId) -> Option<&ProviderAttempt> {
        self.attempts.iter().find(|a| a.provider_id == provider_id)
    }
}
