use crate::actions::{MutationOutcome, INVOICES_PATH};
use crate::models::{
    field, format_currency, Customer, FormFields, FormState, InvoiceListItem, InvoiceStatus,
};
use crate::search::{
    page_href, search_href, SearchParams, PAGE_PARAM, QUERY_PARAM, SEARCH_DEBOUNCE,
};
use crate::startup::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;

/// Response header carrying the listing URL a search fragment belongs to.
pub const SEARCH_HREF_HEADER: &str = "x-search-href";

/// Longest search term whose listing is cached.
pub const MAX_CACHED_QUERY_LEN: usize = 64;

#[derive(Template)]
#[template(path = "invoices/list.html")]
pub struct InvoicesTemplate {
    pub query: String,
    pub results: InvoiceResultsTemplate,
    pub message: Option<String>,
    pub debounce_ms: u128,
}

impl InvoicesTemplate {
    fn new(listing: &Listing, results: InvoiceResultsTemplate, message: Option<String>) -> Self {
        Self {
            query: listing.query.clone(),
            results,
            message,
            debounce_ms: SEARCH_DEBOUNCE.as_millis(),
        }
    }
}

/// Table and pagination; the part of the listing a search replaces.
#[derive(Template)]
#[template(path = "invoices/results.html")]
pub struct InvoiceResultsTemplate {
    pub rows: Vec<InvoiceRow>,
    pub pages: Vec<PageLink>,
    pub current_page: u32,
    pub total_pages: u32,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

pub struct InvoiceRow {
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: String,
    pub date: String,
    pub is_paid: bool,
    pub edit_href: String,
    pub delete_href: String,
}

impl From<InvoiceListItem> for InvoiceRow {
    fn from(item: InvoiceListItem) -> Self {
        Self {
            is_paid: InvoiceStatus::parse(&item.status) == Some(InvoiceStatus::Paid),
            edit_href: format!("{}/{}/edit", INVOICES_PATH, item.id),
            delete_href: format!("{}/{}/delete", INVOICES_PATH, item.id),
            amount: format_currency(item.amount),
            date: item.date.format("%b %-d, %Y").to_string(),
            name: item.name,
            email: item.email,
            image_url: item.image_url,
        }
    }
}

pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub is_current: bool,
}

#[derive(Template)]
#[template(path = "invoices/form.html")]
pub struct InvoiceFormTemplate {
    pub title: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub customers: Vec<CustomerOption>,
    pub has_customer: bool,
    pub amount: String,
    pub is_pending: bool,
    pub is_paid: bool,
    pub customer_errors: Vec<String>,
    pub amount_errors: Vec<String>,
    pub status_errors: Vec<String>,
    pub message: Option<String>,
}

pub struct CustomerOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

impl InvoiceFormTemplate {
    fn new(
        title: &'static str,
        action: String,
        submit_label: &'static str,
        customers: Vec<Customer>,
        fields: &FormFields,
        state: &FormState,
    ) -> Self {
        let selected = fields.value(field::CUSTOMER_ID);
        let status = InvoiceStatus::parse(fields.value(field::STATUS));

        Self {
            title,
            action,
            submit_label,
            has_customer: customers.iter().any(|c| c.id.to_string() == selected),
            customers: customers
                .into_iter()
                .map(|c| CustomerOption {
                    selected: c.id.to_string() == selected,
                    id: c.id.to_string(),
                    name: c.name,
                })
                .collect(),
            amount: fields.value(field::AMOUNT).to_string(),
            is_pending: status == Some(InvoiceStatus::Pending),
            is_paid: status == Some(InvoiceStatus::Paid),
            customer_errors: state.errors_for(field::CUSTOMER_ID).to_vec(),
            amount_errors: state.errors_for(field::AMOUNT).to_vec(),
            status_errors: state.errors_for(field::STATUS).to_vec(),
            message: state.message.clone(),
        }
    }

    pub fn create(customers: Vec<Customer>, fields: &FormFields, state: &FormState) -> Self {
        Self::new(
            "Create Invoice",
            format!("{}/create", INVOICES_PATH),
            "Create Invoice",
            customers,
            fields,
            state,
        )
    }

    pub fn edit(id: Uuid, customers: Vec<Customer>, fields: &FormFields, state: &FormState) -> Self {
        Self::new(
            "Edit Invoice",
            format!("{}/{}/edit", INVOICES_PATH, id),
            "Edit Invoice",
            customers,
            fields,
            state,
        )
    }
}

fn render(template: &impl Template) -> Result<String, AppError> {
    template
        .render()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Template render failed: {}", e)))
}

/// The listing's `query` and `page`, read from a raw query string.
struct Listing {
    raw: String,
    params: SearchParams,
    query: String,
    page: u32,
}

impl Listing {
    fn parse(raw: &str) -> Self {
        let params = SearchParams::parse(raw);
        let query = params.get(QUERY_PARAM).unwrap_or_default().to_string();
        let page = params
            .get(PAGE_PARAM)
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        Self {
            raw: raw.to_string(),
            params,
            query,
            page,
        }
    }

    /// Canonical cache key, or `None` when the URL carries parameters other
    /// than `query` and `page` or a search term too long to be worth caching.
    fn cache_key(&self) -> Option<String> {
        let only_listing_params = self
            .params
            .keys()
            .all(|key| key == QUERY_PARAM || key == PAGE_PARAM);
        if !only_listing_params || self.query.len() > MAX_CACHED_QUERY_LEN {
            return None;
        }

        let mut canonical = SearchParams::default();
        if !self.query.is_empty() {
            canonical.set(QUERY_PARAM, self.query.as_str());
        }
        if self.page > 1 {
            canonical.set(PAGE_PARAM, self.page.to_string());
        }
        Some(canonical.href(INVOICES_PATH))
    }

    async fn load(&self, state: &AppState) -> Result<InvoiceResultsTemplate, AppError> {
        let (items, total_pages) = tokio::try_join!(
            state.store.search_invoices(&self.query, self.page),
            state.store.count_invoice_pages(&self.query),
        )?;

        let current_page = self.page;
        let link = |page: u32| page_href(INVOICES_PATH, &self.raw, page);
        Ok(InvoiceResultsTemplate {
            rows: items.into_iter().map(InvoiceRow::from).collect(),
            pages: (1..=total_pages)
                .map(|number| PageLink {
                    number,
                    href: link(number),
                    is_current: number == current_page,
                })
                .collect(),
            previous_href: (current_page > 1).then(|| link(current_page - 1)),
            next_href: (current_page < total_pages).then(|| link(current_page + 1)),
            current_page,
            total_pages,
        })
    }
}

/// Listing page. Rendered HTML is cached per canonical listing URL until the
/// next mutation revalidates the listing.
pub async fn list_invoices(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, AppError> {
    let listing = Listing::parse(&raw.unwrap_or_default());
    let key = listing.cache_key();
    if let Some(html) = key.as_deref().and_then(|key| state.pages.get(key)) {
        return Ok(Html(html));
    }

    // Taken before reading storage so a mutation landing mid-render keeps
    // this page out of the cache.
    let generation = state.pages.generation();
    let results = listing.load(&state).await?;
    let html = render(&InvoicesTemplate::new(&listing, results, None))?;

    if let Some(key) = key {
        state.pages.insert_if_generation(&key, &html, generation);
    }
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub term: String,
    /// Query string of the page the search box lives on.
    #[serde(default)]
    pub current: String,
}

/// Results fragment for a search typed into the listing page. The listing
/// URL the browser should show is returned in `x-search-href`.
pub async fn search_invoices(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Response, AppError> {
    let href = search_href(INVOICES_PATH, &request.current, &request.term);
    let query = href.split_once('?').map(|(_, query)| query).unwrap_or_default();

    let results = Listing::parse(query).load(&state).await?;
    tracing::debug!(term = %request.term, href = %href, "Search results rendered");

    Ok(([(SEARCH_HREF_HEADER, href)], Html(render(&results)?)).into_response())
}

pub async fn create_invoice_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let customers = state.store.list_customers().await?;
    let page = InvoiceFormTemplate::create(customers, &FormFields::new(), &FormState::default());
    Ok(Html(render(&page)?))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let fields = FormFields::from_pairs(pairs);

    match state.actions.create_invoice(fields.clone()).await {
        MutationOutcome::Failed(form_state) => {
            let customers = state.store.list_customers().await?;
            let page = InvoiceFormTemplate::create(customers, &fields, &form_state);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(render(&page)?)).into_response())
        }
        outcome => Ok(navigate(outcome)),
    }
}

/// Edit form prefilled from the stored invoice; 404 when it does not exist.
pub async fn edit_invoice_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let (invoice, customers) = tokio::try_join!(
        state.store.get_invoice(id),
        state.store.list_customers(),
    )?;
    let invoice = invoice.ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice {} not found", id)))?;

    let fields = FormFields::new()
        .with(field::CUSTOMER_ID, invoice.customer_id.to_string())
        .with(field::AMOUNT, Decimal::new(invoice.amount, 2).to_string())
        .with(field::STATUS, invoice.status);

    let page = InvoiceFormTemplate::edit(id, customers, &fields, &FormState::default());
    Ok(Html(render(&page)?))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let fields = FormFields::from_pairs(pairs);

    match state.actions.update_invoice(id, fields.clone()).await {
        MutationOutcome::Failed(form_state) => {
            let customers = state.store.list_customers().await?;
            let page = InvoiceFormTemplate::edit(id, customers, &fields, &form_state);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(render(&page)?)).into_response())
        }
        outcome => Ok(navigate(outcome)),
    }
}

/// Deletes and sends the browser back to the listing page it came from. A
/// failed delete re-renders that listing with the error message.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let back = listing_referer(&headers).unwrap_or_else(|| INVOICES_PATH.to_string());

    match state.actions.delete_invoice(id).await {
        MutationOutcome::Failed(form_state) => {
            let listing = Listing::parse(back.split_once('?').map(|(_, q)| q).unwrap_or_default());
            let results = listing.load(&state).await?;
            let page = InvoicesTemplate::new(&listing, results, form_state.message);
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(render(&page)?)).into_response())
        }
        _ => Ok(Redirect::to(&back).into_response()),
    }
}

fn navigate(outcome: MutationOutcome) -> Response {
    match outcome {
        MutationOutcome::Redirect(to) => Redirect::to(&to).into_response(),
        _ => Redirect::to(INVOICES_PATH).into_response(),
    }
}

/// Path and query of the `Referer` when it points at the listing page.
fn listing_referer(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let uri = referer.parse::<Uri>().ok()?;
    if uri.path() != INVOICES_PATH {
        return None;
    }
    uri.path_and_query().map(|pq| pq.as_str().to_string())
}
