//! Tagged money values for the dual-currency pricing scheme.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts wrap `rust_decimal::Decimal` and carry the currency unit they
//! are expressed in, so base- and display-currency figures cannot be mixed
//! by accident.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The two currency units the system distinguishes.
///
/// Every persisted monetary figure is `Base`; `Display` figures exist only
/// at the form/readout boundary and are produced by an explicit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyUnit {
    /// The currency invoices and pricing are stored in.
    Base,
    /// The currency an administrator may choose to view/enter figures in.
    Display,
}

/// A monetary amount tagged with the unit it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount, with arbitrary decimal precision.
    pub amount: Decimal,
    /// The currency unit the amount is expressed in.
    pub unit: CurrencyUnit,
}

impl Money {
    /// Creates a new tagged amount.
    #[must_use]
    pub const fn new(amount: Decimal, unit: CurrencyUnit) -> Self {
        Self { amount, unit }
    }

    /// Creates a base-currency amount.
    #[must_use]
    pub const fn base(amount: Decimal) -> Self {
        Self::new(amount, CurrencyUnit::Base)
    }

    /// Creates a display-currency amount.
    #[must_use]
    pub const fn display(amount: Decimal) -> Self {
        Self::new(amount, CurrencyUnit::Display)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Converts into base currency at `rate` base units per display unit.
    ///
    /// Already-base amounts pass through unchanged. The conversion is total:
    /// a zero or negative rate behaves as a rate of one.
    #[must_use]
    pub fn to_base(self, rate: Decimal) -> Self {
        match self.unit {
            CurrencyUnit::Base => self,
            CurrencyUnit::Display => Self::base(self.amount * effective_rate(rate)),
        }
    }

    /// Converts into display currency at `rate` base units per display unit.
    ///
    /// Already-display amounts pass through unchanged.
    #[must_use]
    pub fn to_display(self, rate: Decimal) -> Self {
        match self.unit {
            CurrencyUnit::Display => self,
            CurrencyUnit::Base => Self::display(self.amount / effective_rate(rate)),
        }
    }
}

impl std::fmt::Display for CurrencyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Display => write!(f, "display"),
        }
    }
}

impl std::str::FromStr for CurrencyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "display" => Ok(Self::Display),
            _ => Err(format!("Unknown currency unit: {s}")),
        }
    }
}

/// Guards a conversion rate before it is used as a multiplier or divisor.
///
/// A zero (or negative) stored rate must never zero out or flip an amount,
/// so such rates act as a rate of one.
#[must_use]
pub fn effective_rate(rate: Decimal) -> Decimal {
    if rate > Decimal::ZERO {
        rate
    } else {
        Decimal::ONE
    }
}

/// Rounds a monetary amount to two decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_display_to_base() {
        // 0.02 display at 90000 base per display unit -> 1800 base
        let money = Money::display(dec!(0.02));
        let base = money.to_base(dec!(90000));
        assert_eq!(base.unit, CurrencyUnit::Base);
        assert_eq!(base.amount, dec!(1800));
    }

    #[test]
    fn test_base_to_display_round_trip() {
        let rate = dec!(90000);
        let original = Money::base(dec!(1800));
        let display = original.to_display(rate);
        assert_eq!(display.amount, dec!(0.02));
        assert_eq!(display.to_base(rate), original);
    }

    #[test]
    fn test_base_passes_through_to_base() {
        let money = Money::base(dec!(1500));
        assert_eq!(money.to_base(dec!(90000)), money);
    }

    #[test]
    fn test_zero_rate_acts_as_one() {
        assert_eq!(effective_rate(Decimal::ZERO), Decimal::ONE);
        assert_eq!(effective_rate(dec!(-5)), Decimal::ONE);
        assert_eq!(effective_rate(dec!(89700)), dec!(89700));

        let money = Money::base(dec!(250));
        assert_eq!(money.to_display(Decimal::ZERO).amount, dec!(250));
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_currency_unit_from_str() {
        assert_eq!(CurrencyUnit::from_str("base").unwrap(), CurrencyUnit::Base);
        assert_eq!(
            CurrencyUnit::from_str("DISPLAY").unwrap(),
            CurrencyUnit::Display
        );
        assert!(CurrencyUnit::from_str("usd").is_err());
    }

    #[test]
    fn test_currency_unit_display() {
        assert_eq!(CurrencyUnit::Base.to_string(), "base");
        assert_eq!(CurrencyUnit::Display.to_string(), "display");
    }
}
