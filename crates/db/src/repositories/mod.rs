//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. They are also the system boundary: the HTTP layer,
//! import jobs, and scheduled tasks call these methods directly.

pub mod dashboard;
pub mod expense;
pub mod invoice;
pub mod pricing;
pub mod user;

pub use dashboard::{DashboardError, DashboardRepository};
pub use expense::{
    CreateExpenseInput, DailyExpense, ExpenseError, ExpenseRepository, ExpenseSummary, parse_kind,
};
pub use invoice::{
    BulkRepriceInput, CreateInvoiceInput, InvoiceError, InvoiceFilter, InvoiceRepository,
    ReportTotals, UpdateInvoiceInput,
};
pub use pricing::{PricingError, PricingRepository};
pub use user::{CreateUserInput, UpdateUserInput, UserError, UserRepository};
