use std::io::Read;
use std::path::Path;

use anyhow::Context;
use bridgeview_market_data::{
    build_providers, AggregatedSnapshots, Aggregator, AggregatorConfig, ProviderId,
    ProviderSettings, SnapshotRequest, SymbolGrouper,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("BV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the JSON result, so logs go to stderr
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn load_provider_settings(path: &Path) -> anyhow::Result<Vec<ProviderSettings>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read provider settings from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid provider settings in {}", path.display()))
}

pub fn build_aggregator(config: &Config) -> anyhow::Result<Aggregator> {
    let settings = load_provider_settings(&config.providers_file)?;
    let providers = build_providers(&settings)?;
    tracing::info!(
        "Loaded {} providers from {}",
        providers.len(),
        config.providers_file.display()
    );
    Ok(Aggregator::with_config(
        providers,
        AggregatorConfig {
            default_timeout: config.request_timeout,
        },
    ))
}

pub fn parse_filter(ids: &[String]) -> anyhow::Result<Vec<ProviderId>> {
    ids.iter()
        .map(|id| id.parse::<ProviderId>().map_err(anyhow::Error::from))
        .collect()
}

pub fn parse_request(raw: &str) -> anyhow::Result<SnapshotRequest> {
    if raw.trim().is_empty() {
        return Ok(SnapshotRequest::listing_only());
    }
    serde_json::from_str(raw).context("Invalid snapshot request")
}

pub fn read_request(config: &Config) -> anyhow::Result<SnapshotRequest> {
    let raw = match &config.request_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read request from stdin")?;
            raw
        }
    };
    parse_request(&raw)
}

pub fn render(snapshots: &AggregatedSnapshots, group_symbols: bool) -> anyhow::Result<String> {
    let rendered = if group_symbols {
        serde_json::to_string_pretty(&SymbolGrouper::group_snapshots(snapshots))?
    } else {
        serde_json::to_string_pretty(snapshots)?
    };
    Ok(rendered)
}

pub async fn run(config: &Config) -> anyhow::Result<String> {
    let aggregator = build_aggregator(config)?;
    let request = read_request(config)?;
    let filter = config
        .provider_filter
        .as_deref()
        .map(parse_filter)
        .transpose()?;

    let (result, diagnostics) = aggregator
        .aggregate_with_diagnostics(&request, filter.as_deref())
        .await;
    let snapshots = result?;

    for (id, outcome) in diagnostics.failures() {
        tracing::warn!("{} unavailable this cycle: {}", id, outcome);
    }

    render(&snapshots, config.group_symbols)
}
