//! Invoice mutations: normalize, validate, persist, revalidate, navigate.
//!
//! Every operation resolves to exactly one [`MutationOutcome`]. Store
//! failures are logged here and reported to the user as a generic message;
//! raw database errors never reach the form.

use crate::models::{field, FieldErrors, FormFields, FormState, InvoiceInput};
use crate::services::metrics::record_mutation;
use crate::services::{Clock, InvoiceStore, Revalidator};
use crate::validation::{safe_parse, to_minor_units};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Listing route; revalidated after every mutation and the redirect target
/// of create and update.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

pub const CREATE_INVALID_MESSAGE: &str = "Missing fields. Failed to create invoice.";
pub const CREATE_DB_ERROR_MESSAGE: &str = "Database Error: Failed to create invoice.";
pub const UPDATE_INVALID_MESSAGE: &str = "Invalid fields. Failed to update invoice.";
pub const UPDATE_DB_ERROR_MESSAGE: &str = "Database Error: Failed to update invoice.";
pub const DELETE_DB_ERROR_MESSAGE: &str = "Database Error: Failed to delete invoice.";

/// Result of a mutation as seen by the web layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Persisted; the caller navigates to this path and renders nothing else.
    Redirect(String),
    /// Persisted; the caller stays on the current page and re-renders it.
    Refreshed,
    /// Nothing was navigated; render this state into the current form.
    Failed(FormState),
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, MutationOutcome::Failed(_))
    }
}

/// Replace the client amount with string-encoded minor units and stamp
/// today's date over whatever date was submitted.
pub fn normalize(mut fields: FormFields, today: NaiveDate) -> FormFields {
    let cents = to_minor_units(fields.value(field::AMOUNT))
        .map(|cents| cents.to_string())
        .unwrap_or_default();
    fields.set(field::AMOUNT, cents);
    fields.set(field::DATE, today.format("%Y-%m-%d").to_string());
    fields
}

/// The create/update/delete pipeline with its collaborators injected.
#[derive(Clone)]
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    revalidator: Arc<dyn Revalidator>,
    clock: Arc<dyn Clock>,
}

impl InvoiceActions {
    pub fn new(
        store: Arc<dyn InvoiceStore>,
        revalidator: Arc<dyn Revalidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            revalidator,
            clock,
        }
    }

    fn prepare(&self, fields: FormFields) -> Result<InvoiceInput, FieldErrors> {
        let fields = normalize(fields, self.clock.today());
        safe_parse(&fields).inspect_err(|errors| {
            debug!(fields = ?errors.keys().collect::<Vec<_>>(), "Invoice submission rejected");
        })
    }

    fn listing_redirect(&self) -> MutationOutcome {
        self.revalidator.revalidate_path(INVOICES_PATH);
        MutationOutcome::Redirect(INVOICES_PATH.to_string())
    }

    #[instrument(skip(self, fields))]
    pub async fn create_invoice(&self, fields: FormFields) -> MutationOutcome {
        let input = match self.prepare(fields) {
            Ok(input) => input,
            Err(errors) => {
                record_mutation("create", "invalid");
                return MutationOutcome::Failed(FormState::invalid(errors, CREATE_INVALID_MESSAGE));
            }
        };

        match self.store.create_invoice(&input).await {
            Ok(id) => {
                info!(invoice_id = %id, "Invoice created");
                record_mutation("create", "success");
                self.listing_redirect()
            }
            Err(e) => {
                error!(error = %e, "Failed to create invoice");
                record_mutation("create", "db_error");
                MutationOutcome::Failed(FormState::failed(CREATE_DB_ERROR_MESSAGE))
            }
        }
    }

    #[instrument(skip(self, fields), fields(invoice_id = %id))]
    pub async fn update_invoice(&self, id: Uuid, fields: FormFields) -> MutationOutcome {
        let input = match self.prepare(fields) {
            Ok(input) => input,
            Err(errors) => {
                record_mutation("update", "invalid");
                return MutationOutcome::Failed(FormState::invalid(errors, UPDATE_INVALID_MESSAGE));
            }
        };

        match self.store.update_invoice(id, &input).await {
            Ok(rows) => {
                // An id that matched nothing is still a completed update.
                info!(rows_affected = rows, "Invoice update applied");
                record_mutation("update", "success");
                self.listing_redirect()
            }
            Err(e) => {
                error!(error = %e, "Failed to update invoice");
                record_mutation("update", "db_error");
                MutationOutcome::Failed(FormState::failed(UPDATE_DB_ERROR_MESSAGE))
            }
        }
    }

    /// Delete failures are reported, not swallowed. The listing is
    /// revalidated after every attempt.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn delete_invoice(&self, id: Uuid) -> MutationOutcome {
        let result = self.store.delete_invoice(id).await;
        self.revalidator.revalidate_path(INVOICES_PATH);

        match result {
            Ok(rows) => {
                info!(rows_affected = rows, "Invoice delete applied");
                record_mutation("delete", "success");
                MutationOutcome::Refreshed
            }
            Err(e) => {
                error!(error = %e, "Failed to delete invoice");
                record_mutation("delete", "db_error");
                MutationOutcome::Failed(FormState::failed(DELETE_DB_ERROR_MESSAGE))
            }
        }
    }
}
