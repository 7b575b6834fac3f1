//! Price schedule, tier fees, and viewing-currency transforms.
//!
//! All persisted pricing figures are BASE currency. The administrator may
//! view and enter figures in the display currency; the transforms between
//! the stored schedule and the form happen here and nowhere else.

pub mod service;
pub mod types;


pub use service::PricingService;
pub use types::{AMP_TIERS, PriceForm, PriceSchedule, PricingReadout};
