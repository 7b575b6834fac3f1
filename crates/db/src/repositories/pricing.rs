//! Pricing repository: the self-healing singleton price schedule.
//!
//! `get` never fails visibly over a missing row or missing schema columns:
//! an absent row is created with zero prices and the default conversion
//! rate, and absent currency columns are added on the fly (the same
//! additive statements the migration runs) with the read retried once.
//! Anything else propagates.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
};
use tracing::{info, warn};
use uuid::Uuid;

use gridbill_core::pricing::{PriceForm, PriceSchedule, PricingReadout, PricingService};

use crate::entities::{pricing, sea_orm_active_enums::CurrencyUnit};
use crate::migration::ADD_CURRENCY_COLUMNS_SQL;

/// Conversion rate a fresh pricing row starts with.
fn default_conversion_rate() -> Decimal {
    Decimal::from(90_000)
}

/// Error types for pricing operations.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Pricing repository.
#[derive(Debug, Clone)]
pub struct PricingRepository {
    db: DatabaseConnection,
}

impl PricingRepository {
    /// Creates a new pricing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the current price schedule, creating defaults if none exist.
    pub async fn get(&self) -> Result<PriceSchedule, PricingError> {
        let model = match self.latest().await {
            Ok(model) => model,
            Err(err) if is_undefined_column(&err) => {
                warn!(error = %err, "pricing table is missing currency columns, healing");
                self.db.execute_unprepared(ADD_CURRENCY_COLUMNS_SQL).await?;
                self.latest().await?
            }
            Err(err) => return Err(err.into()),
        };

        match model {
            Some(model) => Ok(to_schedule(&model)),
            None => self.create_default().await,
        }
    }

    /// Saves figures entered in the admin's viewing currency.
    ///
    /// Display-currency input is converted to base before storage; the
    /// conversion rate itself is stored as entered. Returns the stored
    /// schedule.
    pub async fn set(&self, form: &PriceForm) -> Result<PriceSchedule, PricingError> {
        let schedule = PricingService::normalize(form);
        let now = Utc::now().into();

        match self.latest().await? {
            Some(existing) => {
                let mut active: pricing::ActiveModel = existing.into();
                active.unit_price = Set(schedule.unit_price);
                active.fee_5 = Set(schedule.fee_5);
                active.fee_10 = Set(schedule.fee_10);
                active.fee_15 = Set(schedule.fee_15);
                active.fee_20 = Set(schedule.fee_20);
                active.currency_code = Set(schedule.unit.into());
                active.conversion_rate = Set(schedule.conversion_rate);
                active.updated_at = Set(now);
                active.update(&self.db).await?;
            }
            None => {
                let row = pricing::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    unit_price: Set(schedule.unit_price),
                    fee_5: Set(schedule.fee_5),
                    fee_10: Set(schedule.fee_10),
                    fee_15: Set(schedule.fee_15),
                    fee_20: Set(schedule.fee_20),
                    currency_code: Set(schedule.unit.into()),
                    conversion_rate: Set(schedule.conversion_rate),
                    updated_at: Set(now),
                };
                row.insert(&self.db).await?;
            }
        }

        info!(unit = %schedule.unit, "pricing saved");
        Ok(schedule)
    }

    /// The schedule expressed in the admin's viewing currency, for forms.
    pub async fn display(&self) -> Result<PriceForm, PricingError> {
        Ok(PricingService::display_form(&self.get().await?))
    }

    /// The pricing read API payload (base currency).
    pub async fn readout(&self) -> Result<PricingReadout, PricingError> {
        Ok(PricingReadout::from_schedule(&self.get().await?))
    }

    /// Latest pricing row; the newest save wins.
    async fn latest(&self) -> Result<Option<pricing::Model>, DbErr> {
        pricing::Entity::find()
            .order_by_desc(pricing::Column::UpdatedAt)
            .order_by_desc(pricing::Column::Id)
            .one(&self.db)
            .await
    }

    async fn create_default(&self) -> Result<PriceSchedule, PricingError> {
        info!("no pricing row found, creating zero-priced defaults");
        let row = pricing::ActiveModel {
            id: Set(Uuid::new_v4()),
            unit_price: Set(Decimal::ZERO),
            fee_5: Set(Decimal::ZERO),
            fee_10: Set(Decimal::ZERO),
            fee_15: Set(Decimal::ZERO),
            fee_20: Set(Decimal::ZERO),
            currency_code: Set(CurrencyUnit::Base),
            conversion_rate: Set(default_conversion_rate()),
            updated_at: Set(Utc::now().into()),
        };
        let model = row.insert(&self.db).await?;
        Ok(to_schedule(&model))
    }
}

/// Maps a pricing row onto the pure schedule type.
fn to_schedule(model: &pricing::Model) -> PriceSchedule {
    PriceSchedule {
        unit_price: model.unit_price,
        fee_5: model.fee_5,
        fee_10: model.fee_10,
        fee_15: model.fee_15,
        fee_20: model.fee_20,
        unit: model.currency_code.clone().into(),
        conversion_rate: model.conversion_rate,
    }
}

/// Postgres reports a missing column as `undefined_column`; by the time it
/// reaches us only the message text is left to recognise it by.
fn is_undefined_column(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("column") && msg.contains("does not exist")
}
