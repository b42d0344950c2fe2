//! Decimal-precision rate normalization.
//!
//! Raw token amounts arrive as integer strings in base units. They are
//! scaled by `10^decimals` with `rust_decimal` so large amounts never pass
//! through floating point. Floats only appear at the wire boundary
//! (`Rate::effective_rate`, `Rate::total_fees_usd`).

use chrono::{DateTime, Utc};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{Asset, Rate};

/// Largest scale a `Decimal` can carry.
pub const MAX_DECIMALS: u32 = 28;

/// Parse a raw base-unit amount. Only ASCII digits are accepted.
pub fn parse_amount(amount: &str) -> Result<u128, MarketDataError> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MarketDataError::InvalidRateInput(format!(
            "amount '{}' is not a non-negative integer",
            amount
        )));
    }
    amount.parse::<u128>().map_err(|_| {
        MarketDataError::InvalidRateInput(format!("amount '{}' is out of range", amount))
    })
}

/// Scale a raw integer amount down by `10^decimals`.
///
/// # Examples
///
/// ```
/// use bridgeview_market_data::normalizer::normalize;
/// use rust_decimal::Decimal;
///
/// assert_eq!(normalize("1000000", 6).unwrap(), Decimal::ONE);
/// assert_eq!(normalize("1500000000000000000", 18).unwrap().to_string(), "1.5");
/// ```
pub fn normalize(amount: &str, decimals: u32) -> Result<Decimal, MarketDataError> {
    if decimals > MAX_DECIMALS {
        return Err(MarketDataError::InvalidRateInput(format!(
            "decimals {} exceeds the supported maximum of {}",
            decimals, MAX_DECIMALS
        )));
    }

    let value = parse_amount(amount)?;
    let mantissa = i128::try_from(value).map_err(|_| {
        MarketDataError::InvalidRateInput(format!("amount '{}' is out of range", amount))
    })?;

    Decimal::try_from_i128_with_scale(mantissa, decimals)
        .map(|d| d.normalize())
        .map_err(|_| {
            MarketDataError::InvalidRateInput(format!(
                "amount '{}' does not fit a 96-bit decimal",
                amount
            ))
        })
}

/// `normalize(amount_out) / normalize(amount_in)`.
///
/// Fails with [`MarketDataError::InvalidRateInput`] when `amount_in`
/// normalizes to zero or either amount is not a valid integer string.
pub fn effective_rate(
    amount_in: &str,
    source_decimals: u32,
    amount_out: &str,
    destination_decimals: u32,
) -> Result<Decimal, MarketDataError> {
    let input = normalize(amount_in, source_decimals)?;
    if input.is_zero() {
        return Err(MarketDataError::InvalidRateInput(
            "amountIn normalizes to zero".to_string(),
        ));
    }
    let output = normalize(amount_out, destination_decimals)?;

    output
        .checked_div(input)
        .map(|d| d.normalize())
        .ok_or_else(|| MarketDataError::InvalidRateInput("rate overflows".to_string()))
}

/// Effective rate of an existing [`Rate`], recomputed from its raw amounts.
pub fn rate_of(rate: &Rate) -> Result<Decimal, MarketDataError> {
    effective_rate(
        &rate.amount_in,
        rate.source.decimals,
        &rate.amount_out,
        rate.destination.decimals,
    )
}

/// Sum optional USD fee components.
///
/// Missing components contribute zero. Returns `None` only when no component
/// is present at all.
pub fn sum_fees(components: &[Option<Decimal>]) -> Option<Decimal> {
    components
        .iter()
        .flatten()
        .fold(None, |total: Option<Decimal>, fee| {
            Some(total.unwrap_or(Decimal::ZERO).saturating_add(*fee))
        })
}

/// Convert an upstream float USD value. Non-finite values count as missing.
pub fn usd_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

/// Assemble a [`Rate`] with its effective rate and fee total computed in
/// decimal arithmetic.
pub fn build_rate(
    source: Asset,
    destination: Asset,
    amount_in: String,
    amount_out: String,
    fees_usd: &[Option<Decimal>],
    quoted_at: DateTime<Utc>,
) -> Result<Rate, MarketDataError> {
    let rate = effective_rate(
        &amount_in,
        source.decimals,
        &amount_out,
        destination.decimals,
    )?;
    let effective_rate = rate.to_f64().ok_or_else(|| {
        MarketDataError::InvalidRateInput(format!("rate {} is not representable", rate))
    })?;

    Ok(Rate {
        source,
        destination,
        amount_in,
        amount_out,
        effective_rate,
        total_fees_usd: sum_fees(fees_usd).and_then(|total| total.to_f64()),
        quoted_at,
    })
}
