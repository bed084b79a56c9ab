//! Application startup and lifecycle management.

use crate::actions::InvoiceActions;
use crate::config::DashboardConfig;
use crate::handlers::{app, invoices};
use crate::services::{init_metrics, Clock, Database, InvoiceStore, PageCache, SystemClock};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{http_trace_layer, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// Customer avatars and other assets, served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceStore>,
    pub pages: Arc<PageCache>,
    pub actions: Arc<InvoiceActions>,
}

impl AppState {
    /// Wire the mutation pipeline to `store`, revalidating `pages`.
    pub fn new(store: Arc<dyn InvoiceStore>, pages: Arc<PageCache>, clock: Arc<dyn Clock>) -> Self {
        let actions = InvoiceActions::new(store.clone(), pages.clone(), clock);
        Self {
            store,
            pages,
            actions: Arc::new(actions),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(app::health_check))
        .route("/ready", get(app::readiness_check))
        .route("/metrics", get(app::metrics))
        .route("/dashboard/invoices", get(invoices::list_invoices))
        .route("/dashboard/invoices/search", get(invoices::search_invoices))
        .route(
            "/dashboard/invoices/create",
            get(invoices::create_invoice_page).post(invoices::create_invoice),
        )
        .route(
            "/dashboard/invoices/:id/edit",
            get(invoices::edit_invoice_page).post(invoices::update_invoice),
        )
        .route(
            "/dashboard/invoices/:id/delete",
            post(invoices::delete_invoice),
        )
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: DashboardConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    /// Use this in tests when migrations are already applied by the test harness.
    pub async fn build_without_migrations(config: DashboardConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(config: DashboardConfig, run_migrations: bool) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
        }

        let state = AppState::new(
            Arc::new(db),
            Arc::new(PageCache::new()),
            Arc::new(SystemClock),
        );

        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, addr = %address, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Invoices dashboard listener bound");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "invoices-dashboard",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
