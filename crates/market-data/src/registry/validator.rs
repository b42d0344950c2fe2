//! Snapshot validation.
//!
//! Sanitizes provider snapshots before they enter the result map:
//! - Listed assets must decode and agree with their fields; ids are de-duplicated
//!   and `blockchain`/`chain_id` are rewritten to the canonical slug
//! - Rates are recomputed from raw amounts; invalid ones are dropped
//! - Liquidity points must be integer amounts; thresholds are made monotonic
//! - Volumes must be finite and non-negative, one per requested window
//! - Rates/liquidity are stripped when the provider does not claim them
//!
//! Assets, rates and liquidity points fail per item: dropping them is always
//! a soft issue, even when nothing survives. Volumes are the provider's own
//! aggregate figures, so a non-empty volume list with no valid entry is a
//! hard failure and excludes the provider.

use std::collections::HashSet;

use log::warn;
use num_traits::ToPrimitive;

use crate::asset_id::{default_codec, AssetIdCodec};
use crate::errors::MarketDataError;
use crate::models::{
    dedup_by_asset_id, monotonic_thresholds, Asset, LiquidityDepth, ProviderId, Rate, Snapshot,
    SnapshotRequest, VolumeWindow,
};
use crate::normalizer::rate_of;
use crate::provider::ProviderCapabilities;

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Hard failure - reject the snapshot, exclude the provider.
    Hard,
    /// Soft warning - drop the item, keep the snapshot.
    Soft,
}

/// Validation result details.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Snapshot validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Reject the snapshot when every reported volume is invalid.
    pub reject_invalid_volumes: bool,
    /// Strip rates/liquidity the provider's capabilities do not include.
    pub strip_unsupported: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            reject_invalid_volumes: true,
            strip_unsupported: true,
        }
    }
}

/// Snapshot validator.
pub struct SnapshotValidator {
    config: ValidatorConfig,
    codec: &'static AssetIdCodec,
}

impl SnapshotValidator {
    /// Create a new validator with default configuration.
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config,
            codec: default_codec(),
        }
    }

    /// Validate and sanitize one provider's snapshot.
    ///
    /// Returns the cleaned snapshot, or [`MarketDataError::ValidationFailed`]
    /// if any hard issue was found. Soft issues are logged.
    pub fn validate(
        &self,
        provider: ProviderId,
        capabilities: &ProviderCapabilities,
        request: &SnapshotRequest,
        snapshot: Snapshot,
    ) -> Result<Snapshot, MarketDataError> {
        let mut issues = Vec::new();

        let Snapshot {
            volumes,
            mut listed_assets,
            rates,
            liquidity,
        } = snapshot;

        listed_assets.assets = self.validate_assets(listed_assets.assets, &mut issues);
        let volumes = self.validate_volumes(volumes, request, &mut issues);

        let rates = match rates {
            Some(rates) if !capabilities.supports_rates && self.config.strip_unsupported => {
                if !rates.is_empty() {
                    soft(
                        &mut issues,
                        format!("{} rates from a provider without rate support", rates.len()),
                    );
                }
                None
            }
            Some(rates) => Some(self.validate_rates(rates, &mut issues)),
            None => None,
        };

        let liquidity = match liquidity {
            Some(depths) if !capabilities.supports_liquidity && self.config.strip_unsupported => {
                if !depths.is_empty() {
                    soft(
                        &mut issues,
                        format!(
                            "{} liquidity records from a provider without liquidity support",
                            depths.len()
                        ),
                    );
                }
                None
            }
            Some(depths) => Some(self.validate_liquidity(depths, &mut issues)),
            None => None,
        };

        let hard: Vec<_> = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Hard)
            .map(|i| i.message.as_str())
            .collect();

        if !hard.is_empty() {
            return Err(MarketDataError::ValidationFailed {
                message: format!("{}: {}", provider, hard.join("; ")),
            });
        }

        for issue in issues.iter().filter(|i| i.severity == ValidationSeverity::Soft) {
            warn!("Snapshot validation warning for {}: {}", provider, issue.message);
        }

        Ok(Snapshot {
            volumes,
            listed_assets,
            rates,
            liquidity,
        })
    }

    fn validate_assets(
        &self,
        assets: Vec<Asset>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<Asset> {
        let total = assets.len();
        let mut valid = Vec::with_capacity(total);

        for asset in assets {
            match self.canonical(asset) {
                Ok(asset) => valid.push(asset),
                Err(e) => soft(issues, format!("Dropped listed asset: {}", e)),
            }
        }

        if total > 0 && valid.is_empty() {
            soft(issues, format!("All {} listed assets were dropped", total));
        }

        let before = valid.len();
        let valid = dedup_by_asset_id(valid);
        if valid.len() < before {
            soft(
                issues,
                format!("Dropped {} duplicate asset ids", before - valid.len()),
            );
        }
        valid
    }

    fn validate_volumes(
        &self,
        volumes: Vec<VolumeWindow>,
        request: &SnapshotRequest,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<VolumeWindow> {
        let total = volumes.len();
        let mut invalid = 0;
        let mut seen = HashSet::with_capacity(total);
        let mut valid = Vec::with_capacity(total);

        for volume in volumes {
            if !volume.volume_usd.is_finite() || volume.volume_usd < 0.0 {
                invalid += 1;
                soft(
                    issues,
                    format!("Invalid {} volume: {}", volume.window, volume.volume_usd),
                );
            } else if !request.wants_window(volume.window) {
                continue;
            } else if !seen.insert(volume.window) {
                soft(issues, format!("Duplicate {} volume", volume.window));
            } else {
                valid.push(volume);
            }
        }

        if total > 0 && invalid == total {
            let message = format!("All {} volumes are invalid", total);
            if self.config.reject_invalid_volumes {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Hard,
                    message,
                });
            } else {
                soft(issues, message);
            }
        }
        valid
    }

    fn validate_rates(&self, rates: Vec<Rate>, issues: &mut Vec<ValidationIssue>) -> Vec<Rate> {
        let total = rates.len();
        let mut valid = Vec::with_capacity(total);

        for mut rate in rates {
            let endpoints = self.canonical(rate.source.clone()).and_then(|source| {
                self.canonical(rate.destination.clone())
                    .map(|destination| (source, destination))
            });
            match endpoints {
                Ok((source, destination)) => {
                    rate.source = source;
                    rate.destination = destination;
                }
                Err(e) => {
                    soft(issues, format!("Dropped rate: {}", e));
                    continue;
                }
            }

            match rate_of(&rate).map(|value| value.to_f64()) {
                Ok(Some(value)) => {
                    rate.effective_rate = value;
                    rate.total_fees_usd = rate.total_fees_usd.filter(|fee| fee.is_finite());
                    valid.push(rate);
                }
                Ok(None) => soft(issues, "Dropped rate: not representable".to_string()),
                Err(e) => soft(issues, format!("Dropped rate: {}", e)),
            }
        }

        if total > 0 && valid.is_empty() {
            soft(issues, format!("All {} rates were dropped", total));
        }
        valid
    }

    fn validate_liquidity(
        &self,
        depths: Vec<LiquidityDepth>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<LiquidityDepth> {
        let mut points_in = 0;
        let mut points_out = 0;

        let depths: Vec<_> = depths
            .into_iter()
            .map(|mut depth| {
                let before = depth.thresholds.len();
                depth.thresholds = monotonic_thresholds(depth.thresholds);
                points_in += before;
                points_out += depth.thresholds.len();
                if depth.thresholds.len() < before {
                    soft(
                        issues,
                        format!(
                            "Dropped {} liquidity points for {}",
                            before - depth.thresholds.len(),
                            depth.route.source.asset_id
                        ),
                    );
                }
                depth
            })
            .collect();

        if points_in > 0 && points_out == 0 {
            soft(
                issues,
                format!("All {} liquidity points were dropped", points_in),
            );
        }
        depths
    }

    /// Verify an asset and pin `blockchain`/`chain_id` to the slug its id
    /// encodes, so aliases and platform ids group as one chain.
    fn canonical(&self, mut asset: Asset) -> Result<Asset, MarketDataError> {
        asset.verify_identity(self.codec)?;
        let decoded = self.codec.decode(&asset.asset_id)?;
        asset.chain_id = self.codec.chains().chain_id(&decoded.chain);
        asset.blockchain = decoded.chain;
        Ok(asset)
    }
}

impl Default for SnapshotValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn soft(issues: &mut Vec<ValidationIssue>, message: String) {
    issues.push(ValidationIssue {
        severity: ValidationSeverity::Soft,
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LiquidityDepthPoint, ListedAssets, Route, TimeWindow};
    use crate::normalizer::build_rate;
    use chrono::Utc;

    fn usdc(chain: &str, address: &str) -> Asset {
        Asset::from_contract(default_codec(), chain, Some(address), "USDC", 6)
    }

    fn route() -> Route {
        Route::new(usdc("ethereum", "0xa0b8"), usdc("base", "0x8335"))
    }

    fn good_rate() -> Rate {
        let route = route();
        build_rate(
            route.source,
            route.destination,
            "1000000".to_string(),
            "999000".to_string(),
            &[],
            Utc::now(),
        )
        .unwrap()
    }

    fn volume(window: TimeWindow, volume_usd: f64) -> VolumeWindow {
        VolumeWindow {
            window,
            volume_usd,
            measured_at: Utc::now(),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            volumes: vec![volume(TimeWindow::Day, 1_000.0)],
            listed_assets: ListedAssets::new(vec![usdc("ethereum", "0xa0b8")], Utc::now()),
            rates: Some(vec![good_rate()]),
            liquidity: None,
        }
    }

    fn validate(snapshot: Snapshot) -> Result<Snapshot, MarketDataError> {
        SnapshotValidator::new().validate(
            ProviderId::Across,
            &ProviderCapabilities::full(),
            &SnapshotRequest::listing_only(),
            snapshot,
        )
    }

    #[test]
    fn test_valid_snapshot_passes_unchanged() {
        let original = snapshot();
        let validated = validate(original.clone()).unwrap();
        assert_eq!(validated, original);
    }

    #[test]
    fn test_recomputes_effective_rate() {
        let mut input = snapshot();
        if let Some(rates) = input.rates.as_mut() {
            rates[0].effective_rate = 42.0;
        }

        let validated = validate(input).unwrap();
        assert_eq!(validated.rates.unwrap()[0].effective_rate, 0.999);
    }

    #[test]
    fn test_drops_bad_items_softly() {
        let mut input = snapshot();
        let mut forged = usdc("base", "0x8335");
        forged.reference = "0xdead".to_string();
        input.listed_assets.assets.push(forged);
        input.listed_assets.assets.push(usdc("ethereum", "0xa0b8"));

        let mut zero_in = good_rate();
        zero_in.amount_in = "0".to_string();
        input.rates.as_mut().unwrap().push(zero_in);
        input.volumes.push(volume(TimeWindow::Week, f64::NAN));
        input.volumes.push(volume(TimeWindow::Day, 5.0));

        let validated = validate(input).unwrap();

        assert_eq!(validated.listed_assets.len(), 1);
        assert_eq!(validated.rates.unwrap().len(), 1);
        assert_eq!(validated.volumes.len(), 1);
        assert_eq!(validated.volumes[0].volume_usd, 1_000.0);
    }

    #[test]
    fn test_unparseable_listing_keeps_snapshot() {
        let mut input = snapshot();
        input.listed_assets.assets[0].asset_id = "garbage".to_string();

        let validated = validate(input).unwrap();

        assert!(validated.listed_assets.is_empty());
        assert_eq!(validated.rates.unwrap().len(), 1);
        assert_eq!(validated.volumes.len(), 1);
    }

    #[test]
    fn test_all_rates_invalid_leaves_empty_rates() {
        let mut input = snapshot();
        if let Some(rates) = input.rates.as_mut() {
            rates[0].amount_in = "0".to_string();
        }

        let validated = validate(input).unwrap();

        assert_eq!(validated.rates, Some(Vec::new()));
        assert_eq!(validated.listed_assets.len(), 1);
    }

    #[test]
    fn test_all_liquidity_points_invalid_keeps_snapshot() {
        let mut input = snapshot();
        input.liquidity = Some(vec![LiquidityDepth {
            route: route(),
            thresholds: vec![LiquidityDepthPoint {
                max_amount_in: "lots".to_string(),
                slippage_bps: 50,
            }],
            measured_at: Utc::now(),
        }]);

        let validated = validate(input).unwrap();
        let depths = validated.liquidity.unwrap();

        assert_eq!(depths.len(), 1);
        assert!(depths[0].thresholds.is_empty());
    }

    #[test]
    fn test_all_volumes_invalid_is_hard_failure() {
        let mut input = snapshot();
        input.volumes = vec![volume(TimeWindow::Day, f64::NAN)];

        let err = validate(input).unwrap_err();
        assert!(matches!(err, MarketDataError::ValidationFailed { .. }));
    }

    #[test]
    fn test_invalid_volumes_tolerated_when_configured() {
        let mut input = snapshot();
        input.volumes = vec![volume(TimeWindow::Day, -1.0)];

        let validator = SnapshotValidator::with_config(ValidatorConfig {
            reject_invalid_volumes: false,
            ..ValidatorConfig::default()
        });
        let validated = validator
            .validate(
                ProviderId::Across,
                &ProviderCapabilities::full(),
                &SnapshotRequest::listing_only(),
                input,
            )
            .unwrap();
        assert!(validated.volumes.is_empty());
    }

    #[test]
    fn test_blockchain_rewritten_to_canonical_slug() {
        let mut input = snapshot();
        input.listed_assets.assets[0].blockchain = "ethereum".to_string();
        input.listed_assets.assets[0].chain_id = None;
        if let Some(rates) = input.rates.as_mut() {
            rates[0].source.blockchain = "ethereum".to_string();
        }

        let validated = validate(input).unwrap();

        let asset = &validated.listed_assets.assets[0];
        assert_eq!(asset.blockchain, "eth");
        assert_eq!(asset.chain_id, Some(1));
        assert_eq!(validated.rates.unwrap()[0].source.blockchain, "eth");
    }

    #[test]
    fn test_unrequested_windows_are_dropped() {
        let mut input = snapshot();
        input.volumes.push(volume(TimeWindow::All, 9_000.0));
        let request = SnapshotRequest {
            include_windows: vec![TimeWindow::All],
            ..SnapshotRequest::default()
        };

        let validated = SnapshotValidator::new()
            .validate(ProviderId::Across, &ProviderCapabilities::full(), &request, input)
            .unwrap();

        assert_eq!(validated.volumes.len(), 1);
        assert_eq!(validated.volumes[0].window, TimeWindow::All);
    }

    #[test]
    fn test_strips_unsupported_capabilities() {
        let mut input = snapshot();
        input.liquidity = Some(Vec::new());

        let validated = SnapshotValidator::new()
            .validate(
                ProviderId::Across,
                &ProviderCapabilities::listing_only(),
                &SnapshotRequest::listing_only(),
                input,
            )
            .unwrap();

        assert!(validated.rates.is_none());
        assert!(validated.liquidity.is_none());
    }

    #[test]
    fn test_liquidity_made_monotonic() {
        let mut input = snapshot();
        input.liquidity = Some(vec![LiquidityDepth {
            route: route(),
            thresholds: vec![
                LiquidityDepthPoint {
                    max_amount_in: "9000".to_string(),
                    slippage_bps: 50,
                },
                LiquidityDepthPoint {
                    max_amount_in: "5000".to_string(),
                    slippage_bps: 100,
                },
                LiquidityDepthPoint {
                    max_amount_in: "lots".to_string(),
                    slippage_bps: 200,
                },
            ],
            measured_at: Utc::now(),
        }]);

        let validated = validate(input).unwrap();
        let depth = &validated.liquidity.unwrap()[0];

        assert_eq!(depth.thresholds.len(), 2);
        assert!(depth.is_monotonic());
        assert_eq!(depth.thresholds[1].max_amount_in, "9000");
    }
}
