//! Currency definitions and conversions between display prices and base units

use crate::error::{EthcaliError, Result};

/// Represents a cryptocurrency or token with its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// Symbol/ticker (e.g., "USDC", "ETH")
    pub symbol: &'static str,
    /// Full name (e.g., "USD Coin")
    pub name: &'static str,
    /// Number of decimal places
    pub decimals: u8,
    /// Divisor for converting base units to human-readable (10^decimals)
    pub divisor: u64,
}

impl Currency {
    /// Create a new currency with calculated divisor
    pub const fn new(symbol: &'static str, name: &'static str, decimals: u8) -> Self {
        let divisor = 10u64.pow(decimals as u32);
        Self {
            symbol,
            name,
            decimals,
            divisor,
        }
    }

    /// Convert a display amount to base units, rounding to the nearest unit.
    ///
    /// Rejects negative, NaN and infinite inputs.
    pub fn to_base_units(&self, amount: f64) -> Result<u128> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EthcaliError::InvalidAmount(amount.to_string()));
        }
        Ok((amount * self.divisor as f64).round() as u128)
    }

    /// Convert base units back to a display amount
    pub fn from_base_units(&self, units: u128) -> f64 {
        units as f64 / self.divisor as f64
    }

    /// Format base units with trimmed trailing zeros
    ///
    /// e.g., 1_500_000 USDC base units becomes "1.5 USDC"
    pub fn format_trimmed(&self, units: u128) -> String {
        let divisor = self.divisor as u128;
        let whole = units / divisor;
        let remainder = units % divisor;

        if remainder == 0 {
            format!("{whole} {}", self.symbol)
        } else {
            let frac_str = format!("{:0width$}", remainder, width = self.decimals as usize);
            let trimmed = frac_str.trim_end_matches('0');
            format!("{whole}.{trimmed} {}", self.symbol)
        }
    }
}

/// Common currency definitions
pub mod currencies {
    use super::Currency;

    /// USD Coin (USDC) - 6 decimals
    pub const USDC: Currency = Currency::new("USDC", "USD Coin", 6);

    /// Tether (USDT) - 6 decimals
    pub const USDT: Currency = Currency::new("USDT", "Tether USD", 6);

    /// Euro Coin (EURC) - 6 decimals
    pub const EURC: Currency = Currency::new("EURC", "Euro Coin", 6);

    /// Ether - 18 decimals
    pub const ETH: Currency = Currency::new("ETH", "Ether", 18);
}

/// Convert a store price to stablecoin base units.
///
/// # Examples
///
/// ```
/// use ethcali_lib::currency::price_to_base_units;
///
/// assert_eq!(price_to_base_units(25.5).unwrap(), 25_500_000);
/// ```
pub fn price_to_base_units(price: f64) -> Result<u128> {
    currencies::USDC.to_base_units(price)
}

/// Convert stablecoin base units to a store price
pub fn base_units_to_price(units: u128) -> f64 {
    currencies::USDC.from_base_units(units)
}

/// Total spend for `quantity` items at `unit_price`, in stablecoin base units.
///
/// The multiplication happens before rounding so that fractional cents
/// accumulate the same way the store contract expects.
pub fn total_base_units(unit_price: f64, quantity: u64) -> Result<u128> {
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(EthcaliError::InvalidAmount(unit_price.to_string()));
    }
    currencies::USDC.to_base_units(unit_price * quantity as f64)
}
