//! Common test utilities for invoices-dashboard integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use invoices_dashboard::actions::InvoiceActions;
use invoices_dashboard::models::{Customer, FormFields, Invoice, InvoiceInput, InvoiceListItem};
use invoices_dashboard::search::Navigator;
use invoices_dashboard::services::{
    FixedClock, InvoiceStore, MemoryInvoiceStore, PageCache, Revalidator,
};
use invoices_dashboard::startup::{build_router, AppState};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,invoices_dashboard=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn evil_rabbit() -> Customer {
    Customer {
        id: Uuid::parse_str("d6e15727-9fe1-4961-8c5b-ea44a9bd81aa").unwrap(),
        name: "Evil Rabbit".to_string(),
        email: "evil@rabbit.com".to_string(),
        image_url: "/static/customers/evil-rabbit.svg".to_string(),
    }
}

pub fn lee_robinson() -> Customer {
    Customer {
        id: Uuid::parse_str("3958dc9e-742f-4377-85e9-fec4b6a6442a").unwrap(),
        name: "Lee Robinson".to_string(),
        email: "lee@robinson.com".to_string(),
        image_url: "/static/customers/lee-robinson.svg".to_string(),
    }
}

pub fn seeded_store() -> Arc<MemoryInvoiceStore> {
    Arc::new(MemoryInvoiceStore::with_customers(vec![
        evil_rabbit(),
        lee_robinson(),
    ]))
}

/// Counts revalidation signals per path.
#[derive(Default)]
pub struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Revalidator for RecordingRevalidator {
    fn revalidate_path(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

/// Navigator that remembers every href it was asked to show.
#[derive(Default)]
pub struct RecordingNavigator {
    hrefs: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn hrefs(&self) -> Vec<String> {
        self.hrefs.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, href: &str) {
        self.hrefs.lock().unwrap().push(href.to_string());
    }
}

/// In-memory store whose next listing read stops after reading its rows
/// until the test releases it.
pub struct GatedStore {
    inner: Arc<MemoryInvoiceStore>,
    armed: AtomicBool,
    pub reached: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub fn new(inner: Arc<MemoryInvoiceStore>) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(true),
            reached: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl InvoiceStore for GatedStore {
    async fn create_invoice(&self, input: &InvoiceInput) -> Result<Uuid, AppError> {
        self.inner.create_invoice(input).await
    }

    async fn update_invoice(&self, id: Uuid, input: &InvoiceInput) -> Result<u64, AppError> {
        self.inner.update_invoice(id, input).await
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<u64, AppError> {
        self.inner.delete_invoice(id).await
    }

    async fn get_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        self.inner.get_invoice(id).await
    }

    async fn search_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceListItem>, AppError> {
        let rows = self.inner.search_invoices(query, page).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.release.notified().await;
        }
        Ok(rows)
    }

    async fn count_invoice_pages(&self, query: &str) -> Result<u32, AppError> {
        self.inner.count_invoice_pages(query).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.inner.list_customers().await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.inner.health_check().await
    }
}

/// Mutation pipeline wired to in-memory collaborators.
pub struct TestActions {
    pub actions: InvoiceActions,
    pub store: Arc<MemoryInvoiceStore>,
    pub revalidator: Arc<RecordingRevalidator>,
}

pub fn test_actions() -> TestActions {
    init_tracing();

    let store = seeded_store();
    let revalidator = Arc::new(RecordingRevalidator::default());
    let actions = InvoiceActions::new(
        store.clone(),
        revalidator.clone(),
        Arc::new(FixedClock(today())),
    );

    TestActions {
        actions,
        store,
        revalidator,
    }
}

/// Router backed by the in-memory store and a real page cache.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryInvoiceStore>,
    pub pages: Arc<PageCache>,
}

pub fn spawn_router() -> TestApp {
    init_tracing();

    let store = seeded_store();
    let pages = Arc::new(PageCache::new());
    let state = AppState::new(store.clone(), pages.clone(), Arc::new(FixedClock(today())));

    TestApp {
        router: build_router(state),
        store,
        pages,
    }
}

pub fn form(fields: &[(&str, &str)]) -> FormFields {
    FormFields::from_pairs(fields.iter().copied())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
