//! Services module for the invoices dashboard.

pub mod cache;
pub mod clock;
pub mod database;
pub mod metrics;
pub mod store;

pub use cache::{PageCache, Revalidator, MAX_CACHED_PAGES};
pub use clock::{Clock, FixedClock, SystemClock};
pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use store::{InvoiceStore, MemoryInvoiceStore, ITEMS_PER_PAGE};
