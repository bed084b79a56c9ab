//! PostgreSQL-backed invoice store.

use crate::models::{Customer, Invoice, InvoiceInput, InvoiceListItem};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{page_count, InvoiceStore, ITEMS_PER_PAGE};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const SEARCH_FILTER: &str = r#"
    FROM invoices
    JOIN customers ON invoices.customer_id = customers.id
    WHERE customers.name ILIKE $1
       OR customers.email ILIKE $1
       OR invoices.amount::text ILIKE $1
       OR invoices.date::text ILIKE $1
       OR invoices.status ILIKE $1
"#;

/// Database connection pool wrapper.
///
/// Opened once at startup and shared by every request.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "invoices-dashboard"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

/// `%query%` with LIKE wildcards in the user's text escaped.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl InvoiceStore for Database {
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Uuid, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1::uuid, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.customer_id)
        .bind(input.amount)
        .bind(input.status.as_str())
        .bind(input.date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)))?;

        timer.observe_duration();

        info!(invoice_id = %id, amount = input.amount, "Invoice created");

        Ok(id)
    }

    #[instrument(skip(self, input), fields(invoice_id = %id))]
    async fn update_invoice(&self, id: Uuid, input: &InvoiceInput) -> Result<u64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $2::uuid,
                amount = $3,
                status = $4,
                date = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.customer_id)
        .bind(input.amount)
        .bind(input.status.as_str())
        .bind(input.date)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice: {}", e)))?;

        timer.observe_duration();

        let updated = result.rows_affected();
        info!(rows_affected = updated, "Invoice updated");

        Ok(updated)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn delete_invoice(&self, id: Uuid) -> Result<u64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e))
            })?;

        timer.observe_duration();

        let deleted = result.rows_affected();
        info!(rows_affected = deleted, "Invoice deleted");

        Ok(deleted)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, customer_id, amount, status, date
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self))]
    async fn search_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["search_invoices"])
            .start_timer();

        let offset = i64::from(page.saturating_sub(1)) * i64::from(ITEMS_PER_PAGE);
        let sql = format!(
            r#"
            SELECT invoices.id, invoices.customer_id, customers.name, customers.email,
                   customers.image_url, invoices.amount, invoices.status, invoices.date
            {}
            ORDER BY invoices.date DESC, invoices.id
            LIMIT $2 OFFSET $3
            "#,
            SEARCH_FILTER
        );

        let invoices = sqlx::query_as::<_, InvoiceListItem>(&sql)
            .bind(like_pattern(query))
            .bind(i64::from(ITEMS_PER_PAGE))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to search invoices: {}", e))
            })?;

        timer.observe_duration();

        Ok(invoices)
    }

    #[instrument(skip(self))]
    async fn count_invoice_pages(&self, query: &str) -> Result<u32, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_invoice_pages"])
            .start_timer();

        let sql = format!("SELECT COUNT(*) {}", SEARCH_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(like_pattern(query))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e))
            })?;

        timer.observe_duration();

        Ok(page_count(u64::try_from(total).unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_customers"])
            .start_timer();

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, image_url
            FROM customers
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list customers: {}", e)))?;

        timer.observe_duration();

        Ok(customers)
    }

    /// Check database health.
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}
