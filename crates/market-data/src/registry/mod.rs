//! Aggregation module.
//!
//! This module provides orchestration over snapshot providers, including:
//! - Concurrent fan-out with per-provider deadlines and panic isolation
//! - Snapshot validation and sanitization
//! - Per-provider diagnostics for every aggregation

mod aggregator;
mod diagnostics;
mod validator;

pub use aggregator::{Aggregator, AggregatorConfig};
pub use diagnostics::{AggregateDiagnostics, ProviderAttempt, ProviderOutcome};
pub use validator::{SnapshotValidator, ValidationIssue, ValidationSeverity, ValidatorConfig};
