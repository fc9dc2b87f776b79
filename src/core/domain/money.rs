//! Monetary types. All prices, volumes and notionals are exact decimals
//! so every risk comparison stays decimal-safe.

use rust_decimal::Decimal;

/// Price of a single share, in `[0, 1]` for a well-formed prediction market.
pub type Price = Decimal;

/// Traded volume.
pub type Volume = Decimal;

/// Notional value (price * volume summed across legs).
pub type Notional = Decimal;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_and_volume_are_decimal_and_compose() {
        let price: Price = dec!(0.48);
        let volume: Volume = dec!(100);
        let notional: Notional = price * volume;
        assert_eq!(notional, dec!(48.00));
    }
}
