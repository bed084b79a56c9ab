//! Domain models for the invoices dashboard.

mod customer;
mod form;
mod invoice;

pub use customer::Customer;
pub use form::{field, FieldErrors, FormFields, FormState};
pub use invoice::{format_currency, Invoice, InvoiceInput, InvoiceListItem, InvoiceStatus};
