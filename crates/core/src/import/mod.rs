//! Header-driven row parsing for bulk invoice loads.
//!
//! Import files arrive as CSV bytes or as a pre-decoded string matrix (the
//! spreadsheet cell decoding itself happens outside this system). Columns
//! are recognised by alias, every cell parses to a typed outcome, and the
//! caller chooses lenient (fallback-substituting) or strict (fail the
//! batch) handling of unusable values.

pub mod parse;
pub mod service;
pub mod types;


pub use service::{CANONICAL_ORDER, ImportService};
pub use types::{ImportColumn, ImportError, ParseMode, Parsed, ParsedRow};
