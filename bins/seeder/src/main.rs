//! Database seeder for Gridbill development and testing.
//!
//! Seeds an admin and a field employee, a realistic price schedule, two
//! branches with a few months of invoice history, and some expenses.
//!
//! Usage: cargo run --bin seeder

use chrono::{Days, NaiveDate, Utc};
use fake::Fake;
use fake::faker::name::en::Name;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridbill_core::pricing::{PriceForm, PriceSchedule};
use gridbill_db::entities::sea_orm_active_enums::{ExpenseKind, UserRole};
use gridbill_db::repositories::{
    CreateExpenseInput, CreateInvoiceInput, CreateUserInput, ExpenseRepository, InvoiceRepository,
    PricingRepository, UserRepository,
};
use gridbill_shared::{BillingMonth, CurrencyUnit};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridbill=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    info!("Connecting to database...");
    let db = gridbill_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    info!("Seeding users...");
    seed_users(&db).await;

    info!("Seeding pricing...");
    let schedule = seed_pricing(&db).await;

    info!("Seeding branch history...");
    seed_branches(&db, &schedule).await;

    info!("Seeding expenses...");
    seed_expenses(&db).await;

    info!("Seeding complete!");
}

async fn seed_users(db: &DatabaseConnection) {
    let repo = UserRepository::new(db.clone());

    for (username, role, branch, is_admin) in [
        ("admin", UserRole::Admin, None, true),
        ("reader1", UserRole::Employee, Some("101".to_string()), false),
    ] {
        if repo
            .find_by_username(username)
            .await
            .expect("user lookup failed")
            .is_some()
        {
            info!("user {username} already exists, skipping");
            continue;
        }

        repo.create(CreateUserInput {
            username: username.to_string(),
            password: "change-me".to_string(),
            role,
            branch_number: branch,
            min_visible_date: None,
            is_admin,
        })
        .await
        .expect("Failed to seed user");
    }
}

async fn seed_pricing(db: &DatabaseConnection) -> PriceSchedule {
    let repo = PricingRepository::new(db.clone());
    let current = repo.get().await.expect("Failed to read pricing");

    if !current.unit_price.is_zero() {
        info!("pricing already configured, skipping");
        return current;
    }

    repo.set(&PriceForm {
        unit_price: dec!(1500),
        fee_5: dec!(5000),
        fee_10: dec!(10000),
        fee_15: dec!(15000),
        fee_20: dec!(20000),
        unit: CurrencyUnit::Base,
        conversion_rate: dec!(89700),
    })
    .await
    .expect("Failed to seed pricing")
}

async fn seed_branches(db: &DatabaseConnection, schedule: &PriceSchedule) {
    let repo = InvoiceRepository::new(db.clone());
    let mut rng = rand::rng();
    let months = recent_months(3);

    for branch in ["101", "102"] {
        if repo
            .last_for_branch(branch)
            .await
            .expect("branch lookup failed")
            .is_some()
        {
            info!("branch {branch} already has history, skipping");
            continue;
        }

        let customer: String = Name().fake();
        let amps = [5, 10, 15, 20][rng.random_range(0..4)];
        let mut reading = rng.random_range(1000..3000);

        for (idx, month) in months.iter().enumerate() {
            reading += rng.random_range(150..400);
            let is_last = idx == months.len() - 1;

            repo.create(
                CreateInvoiceInput {
                    date: Some(month.first_day() + Days::new(rng.random_range(0..25))),
                    branch_number: branch.to_string(),
                    // Later months carry customer/meter/amps forward from
                    // the branch's last invoice.
                    customer_name: (idx == 0).then(|| customer.clone()),
                    meter_number: (idx == 0).then(|| format!("M-10{branch}")),
                    subscription_amps: (idx == 0).then_some(amps),
                    curr_reading: Some(reading),
                    is_paid: !is_last,
                    ..CreateInvoiceInput::default()
                },
                schedule,
            )
            .await
            .expect("Failed to seed invoice");
        }
    }
}

async fn seed_expenses(db: &DatabaseConnection) {
    let repo = ExpenseRepository::new(db.clone());
    if !repo
        .list(1)
        .await
        .expect("expense lookup failed")
        .is_empty()
    {
        info!("expenses already exist, skipping");
        return;
    }

    let today = Utc::now().date_naive();
    let rows: [(NaiveDate, ExpenseKind, Decimal, Option<Decimal>, &str); 3] = [
        (
            today - Days::new(20),
            ExpenseKind::Fuel,
            dec!(450.00),
            Some(dec!(300)),
            "generator diesel",
        ),
        (
            today - Days::new(12),
            ExpenseKind::Maintenance,
            dec!(120.00),
            None,
            "breaker replacement",
        ),
        (today - Days::new(2), ExpenseKind::Other, dec!(35.50), None, "office supplies"),
    ];

    for (date, kind, cost, litres, description) in rows {
        repo.create(CreateExpenseInput {
            date: Some(date),
            kind,
            cost,
            litres,
            description: Some(description.to_string()),
        })
        .await
        .expect("Failed to seed expense");
    }
}

/// The current month and the `count - 1` before it, oldest first.
fn recent_months(count: usize) -> Vec<BillingMonth> {
    let mut months = Vec::with_capacity(count);
    let mut month = BillingMonth::from_date(Utc::now().date_naive());
    for _ in 0..count {
        months.push(month);
        month = BillingMonth::from_date(month.first_day() - Days::new(1));
    }
    months.reverse();
    months
}
