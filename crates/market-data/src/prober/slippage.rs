use rust_decimal::Decimal;

const BPS_PER_UNIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Slippage of `observed` against `reference`, in basis points.
///
/// A better-than-reference rate counts as zero slippage. Returns `None`
/// when the reference rate is not positive.
pub fn slippage_bps(reference: Decimal, observed: Decimal) -> Option<Decimal> {
    if reference <= Decimal::ZERO {
        return None;
    }
    let shortfall = reference.checked_sub(observed)?;
    let bps = shortfall.checked_div(reference)?.checked_mul(BPS_PER_UNIT)?;
    Some(bps.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_slippage_bps() {
        assert_eq!(slippage_bps(dec!(1), dec!(0.995)), Some(dec!(50)));
        assert_eq!(slippage_bps(dec!(2), dec!(1.98)), Some(dec!(100)));
    }

    #[test]
    fn test_better_rate_is_zero_slippage() {
        assert_eq!(slippage_bps(dec!(1), dec!(1.01)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_zero_reference() {
        assert_eq!(slippage_bps(Decimal::ZERO, dec!(1)), None);
    }
}
