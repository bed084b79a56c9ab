//! Storage boundary for invoices and customers.

use crate::models::{Customer, Invoice, InvoiceInput, InvoiceListItem};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Rows per listing page.
pub const ITEMS_PER_PAGE: u32 = 6;

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice and return the id storage generated for it.
    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Uuid, AppError>;

    /// Overwrite all fields of invoice `id`. Returns the number of rows
    /// affected; 0 when no such invoice exists.
    async fn update_invoice(&self, id: Uuid, input: &InvoiceInput) -> Result<u64, AppError>;

    /// Remove invoice `id`. Returns the number of rows affected.
    async fn delete_invoice(&self, id: Uuid) -> Result<u64, AppError>;

    async fn get_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError>;

    /// One page (1-based) of invoices matching `query`, newest first.
    async fn search_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListItem>, AppError>;

    /// Number of listing pages for `query`.
    async fn count_invoice_pages(&self, query: &str) -> Result<u32, AppError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

pub fn page_count(total: u64) -> u32 {
    u32::try_from(total.div_ceil(u64::from(ITEMS_PER_PAGE))).unwrap_or(u32::MAX)
}

/// In-process store used by tests and local demos.
///
/// Mirrors the database's behaviour where it matters to callers: customer
/// ids must parse as UUIDs and reference a known customer.
#[derive(Default)]
pub struct MemoryInvoiceStore {
    customers: Mutex<Vec<Customer>>,
    invoices: Mutex<Vec<Invoice>>,
    failing: AtomicBool,
    write_calls: AtomicUsize,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: Mutex::new(customers),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of create/update/delete calls received, failed ones included.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Invoice> {
        self.invoices
            .lock()
            .map(|invoices| invoices.clone())
            .unwrap_or_default()
    }

    /// Insert a row directly, bypassing the write checks.
    pub fn seed_invoice(&self, invoice: Invoice) {
        if let Ok(mut invoices) = self.invoices.lock() {
            invoices.push(invoice);
        }
    }

    fn invoices(&self) -> Result<MutexGuard<'_, Vec<Invoice>>, AppError> {
        self.invoices
            .lock()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("invoice table lock poisoned")))
    }

    fn customers(&self) -> Result<MutexGuard<'_, Vec<Customer>>, AppError> {
        self.customers
            .lock()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("customer table lock poisoned")))
    }

    fn begin_write(&self, operation: &str) -> Result<(), AppError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Failed to {}: connection refused",
                operation
            )));
        }
        Ok(())
    }

    fn resolve_customer(&self, customer_id: &str) -> Result<Uuid, AppError> {
        let id = Uuid::parse_str(customer_id).map_err(|_| {
            AppError::DatabaseError(anyhow::anyhow!(
                "invalid input syntax for type uuid: \"{}\"",
                customer_id
            ))
        })?;

        if !self.customers()?.iter().any(|c| c.id == id) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "insert or update on table \"invoices\" violates foreign key constraint \"invoices_customer_id_fkey\""
            )));
        }

        Ok(id)
    }

    fn matching(&self, query: &str) -> Result<Vec<InvoiceListItem>, AppError> {
        let needle = query.to_lowercase();
        let customers = self.customers()?;
        let invoices = self.invoices()?;

        let mut items = invoices
            .iter()
            .filter_map(|invoice| {
                let customer = customers.iter().find(|c| c.id == invoice.customer_id)?;
                Some(InvoiceListItem {
                    id: invoice.id,
                    customer_id: invoice.customer_id,
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                    amount: invoice.amount,
                    status: invoice.status.clone(),
                    date: invoice.date,
                })
            })
            .filter(|item| {
                needle.is_empty()
                    || item.name.to_lowercase().contains(&needle)
                    || item.email.to_lowercase().contains(&needle)
                    || item.amount.to_string().contains(&needle)
                    || item.date.to_string().contains(&needle)
                    || item.status.to_lowercase().contains(&needle)
            })
            .collect::<Vec<_>>();

        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Uuid, AppError> {
        self.begin_write("create invoice")?;
        let customer_id = self.resolve_customer(&input.customer_id)?;

        let id = Uuid::new_v4();
        self.invoices()?.push(Invoice {
            id,
            customer_id,
            amount: input.amount,
            status: input.status.as_str().to_string(),
            date: input.date,
        });
        Ok(id)
    }

    async fn update_invoice(&self, id: Uuid, input: &InvoiceInput) -> Result<u64, AppError> {
        self.begin_write("update invoice")?;
        let customer_id = self.resolve_customer(&input.customer_id)?;

        let mut invoices = self.invoices()?;
        match invoices.iter_mut().find(|invoice| invoice.id == id) {
            Some(invoice) => {
                invoice.customer_id = customer_id;
                invoice.amount = input.amount;
                invoice.status = input.status.as_str().to_string();
                invoice.date = input.date;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<u64, AppError> {
        self.begin_write("delete invoice")?;

        let mut invoices = self.invoices()?;
        let before = invoices.len();
        invoices.retain(|invoice| invoice.id != id);
        Ok((before - invoices.len()) as u64)
    }

    async fn get_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        Ok(self.invoices()?.iter().find(|i| i.id == id).cloned())
    }

    async fn search_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListItem>, AppError> {
        let offset = page.saturating_sub(1).saturating_mul(ITEMS_PER_PAGE) as usize;
        Ok(self
            .matching(query)?
            .into_iter()
            .skip(offset)
            .take(ITEMS_PER_PAGE as usize)
            .collect())
    }

    async fn count_invoice_pages(&self, query: &str) -> Result<u32, AppError> {
        Ok(page_count(self.matching(query)?.len() as u64))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let mut customers = self.customers()?.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
