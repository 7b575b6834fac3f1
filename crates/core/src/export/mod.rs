//! Fixed-order invoice export schema.
//!
//! CSV and spreadsheet output share one column order; re-importing an
//! export (default column order) must reproduce every `total_due`.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::ExportService;
pub use types::{EXPORT_HEADERS, ExportRow};
