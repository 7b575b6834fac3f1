//! Shared types and configuration for Gridbill.
//!
//! This crate provides common types used across all other crates:
//! - Tagged money values with decimal precision
//! - Billing-month arithmetic for the monthly invoice cycle
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{BillingMonth, CurrencyUnit, Money};
