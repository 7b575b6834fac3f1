//! Pricing data types.

use std::collections::BTreeMap;

use gridbill_shared::CurrencyUnit;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The amperage tiers a subscription can be on.
pub const AMP_TIERS: [i32; 4] = [5, 10, 15, 20];

/// The active price schedule. Monetary figures are BASE currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    /// Price per kWh.
    pub unit_price: Decimal,
    /// Flat monthly fee for a 5A subscription.
    pub fee_5: Decimal,
    /// Flat monthly fee for a 10A subscription.
    pub fee_10: Decimal,
    /// Flat monthly fee for a 15A subscription.
    pub fee_15: Decimal,
    /// Flat monthly fee for a 20A subscription.
    pub fee_20: Decimal,
    /// The currency the administrator is currently viewing figures in.
    pub unit: CurrencyUnit,
    /// Conversion rate, base units per display unit. Stored as entered; a
    /// zero rate is neutralised wherever it is actually applied.
    pub conversion_rate: Decimal,
}

impl PriceSchedule {
    /// Flat monthly fee for an amperage tier.
    ///
    /// Exact match against {20, 15, 10, 5}; any other value carries no fee.
    #[must_use]
    pub fn fee_for_amp(&self, amps: i32) -> Decimal {
        match amps {
            20 => self.fee_20,
            15 => self.fee_15,
            10 => self.fee_10,
            5 => self.fee_5,
            _ => Decimal::ZERO,
        }
    }
}

/// Price figures as entered or shown on the admin form, expressed in the
/// currency named by `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceForm {
    /// Price per kWh, in the viewing currency.
    pub unit_price: Decimal,
    /// 5A fee, in the viewing currency.
    pub fee_5: Decimal,
    /// 10A fee, in the viewing currency.
    pub fee_10: Decimal,
    /// 15A fee, in the viewing currency.
    pub fee_15: Decimal,
    /// 20A fee, in the viewing currency.
    pub fee_20: Decimal,
    /// The currency the figures are expressed in.
    pub unit: CurrencyUnit,
    /// Conversion rate, base units per display unit.
    pub conversion_rate: Decimal,
}

/// Payload of the pricing read API: unit price and a map from amperage-tier
/// string to fee, both in BASE currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingReadout {
    /// Price per kWh in base currency.
    pub unit_price: Decimal,
    /// Tier string (`"5"`/`"10"`/`"15"`/`"20"`) to flat fee.
    pub fees: BTreeMap<String, Decimal>,
}

impl PricingReadout {
    /// Builds the readout from a schedule.
    #[must_use]
    pub fn from_schedule(schedule: &PriceSchedule) -> Self {
        let fees = AMP_TIERS
            .iter()
            .map(|&amps| (amps.to_string(), schedule.fee_for_amp(amps)))
            .collect();

        Self {
            unit_price: schedule.unit_price,
            fees,
        }
    }
}
