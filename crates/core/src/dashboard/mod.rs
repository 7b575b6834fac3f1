//! Monthly aggregation for reporting and dashboards.
//!
//! The database layer supplies per-month rollups of invoices and expenses;
//! this module turns them into the chart-ready payload: ordered parallel
//! arrays plus a focus-month snapshot.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::DashboardService;
pub use types::{
    DashboardData, DashboardSeries, FocusSnapshot, MonthlyExpenseTotals, MonthlyInvoiceTotals,
};
