//! `SeaORM` entity definitions.

pub mod expenses;
pub mod invoice_sequences;
pub mod invoices;
pub mod pricing;
pub mod sea_orm_active_enums;
pub mod users;
