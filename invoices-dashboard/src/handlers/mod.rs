pub mod app;
pub mod invoices;
