//! Viewing-currency transforms between the stored schedule and the form.

use gridbill_shared::{CurrencyUnit, Money};

use super::types::{PriceForm, PriceSchedule};

/// Pricing business logic.
pub struct PricingService;

impl PricingService {
    /// Normalises form input into the stored, base-currency schedule.
    ///
    /// Form figures are expressed in the currency the administrator was
    /// viewing (`form.unit`): display-currency input is multiplied by the
    /// conversion rate before storage, base-currency input is stored
    /// unchanged. The rate itself is stored as entered.
    #[must_use]
    pub fn normalize(form: &PriceForm) -> PriceSchedule {
        let rate = form.conversion_rate;
        let to_base = |amount| Money::new(amount, form.unit).to_base(rate).amount;

        PriceSchedule {
            unit_price: to_base(form.unit_price),
            fee_5: to_base(form.fee_5),
            fee_10: to_base(form.fee_10),
            fee_15: to_base(form.fee_15),
            fee_20: to_base(form.fee_20),
            unit: form.unit,
            conversion_rate: rate,
        }
    }

    /// Inverse of [`PricingService::normalize`]: produces the figures to
    /// show on the form, in the schedule's viewing currency.
    #[must_use]
    pub fn display_form(schedule: &PriceSchedule) -> PriceForm {
        let rate = schedule.conversion_rate;
        let to_viewing = |amount| match schedule.unit {
            CurrencyUnit::Base => amount,
            CurrencyUnit::Display => Money::base(amount).to_display(rate).amount,
        };

        PriceForm {
            unit_price: to_viewing(schedule.unit_price),
            fee_5: to_viewing(schedule.fee_5),
            fee_10: to_viewing(schedule.fee_10),
            fee_15: to_viewing(schedule.fee_15),
            fee_20: to_viewing(schedule.fee_20),
            unit: schedule.unit,
            conversion_rate: rate,
        }
    }
}
