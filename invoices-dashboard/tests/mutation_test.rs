//! Integration tests for the create/update/delete pipeline.

mod common;

use chrono::NaiveDate;
use common::{evil_rabbit, form, lee_robinson, test_actions, today};
use invoices_dashboard::actions::{
    MutationOutcome, CREATE_DB_ERROR_MESSAGE, CREATE_INVALID_MESSAGE, DELETE_DB_ERROR_MESSAGE,
    INVOICES_PATH, UPDATE_DB_ERROR_MESSAGE, UPDATE_INVALID_MESSAGE,
};
use invoices_dashboard::models::{field, FormState, Invoice};
use invoices_dashboard::validation::{
    AMOUNT_POSITIVE, AMOUNT_TOO_LARGE, CUSTOMER_REQUIRED, STATUS_REQUIRED,
};
use uuid::Uuid;

fn failed(outcome: MutationOutcome) -> FormState {
    match outcome {
        MutationOutcome::Failed(state) => state,
        other => panic!("expected a failure, got {:?}", other),
    }
}

fn existing_invoice(customer_id: Uuid) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        customer_id,
        amount: 4200,
        status: "paid".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
    }
}

#[tokio::test]
async fn create_persists_cents_and_todays_date() {
    let t = test_actions();
    let customer = evil_rabbit().id.to_string();

    let outcome = t
        .actions
        .create_invoice(form(&[
            (field::CUSTOMER_ID, customer.as_str()),
            (field::AMOUNT, "15.50"),
            (field::STATUS, "pending"),
        ]))
        .await;

    assert_eq!(outcome, MutationOutcome::Redirect(INVOICES_PATH.to_string()));
    assert_eq!(t.revalidator.paths(), vec![INVOICES_PATH.to_string()]);

    let rows = t.store.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, evil_rabbit().id);
    assert_eq!(rows[0].amount, 1550);
    assert_eq!(rows[0].status, "pending");
    assert_eq!(rows[0].date, today());
}

#[tokio::test]
async fn client_supplied_date_is_ignored() {
    let t = test_actions();
    let customer = lee_robinson().id.to_string();

    let outcome = t
        .actions
        .create_invoice(form(&[
            (field::CUSTOMER_ID, customer.as_str()),
            (field::AMOUNT, "0.125"),
            (field::STATUS, "paid"),
            (field::DATE, "1999-12-31"),
        ]))
        .await;

    assert!(outcome.is_success());
    let rows = t.store.snapshot();
    assert_eq!(rows[0].date, today());
    // 12.5 cents rounds half away from zero.
    assert_eq!(rows[0].amount, 13);
}

#[tokio::test]
async fn invalid_create_reports_each_field_without_writing() {
    let t = test_actions();

    let state = failed(
        t.actions
            .create_invoice(form(&[(field::AMOUNT, "0"), (field::STATUS, "overdue")]))
            .await,
    );

    assert_eq!(state.message.as_deref(), Some(CREATE_INVALID_MESSAGE));
    assert_eq!(state.errors_for(field::CUSTOMER_ID), [CUSTOMER_REQUIRED]);
    assert_eq!(state.errors_for(field::AMOUNT), [AMOUNT_POSITIVE]);
    assert_eq!(state.errors_for(field::STATUS), [STATUS_REQUIRED]);
    assert_eq!(t.store.write_calls(), 0);
    assert!(t.revalidator.paths().is_empty());
}

#[tokio::test]
async fn negative_and_non_numeric_amounts_are_rejected() {
    let t = test_actions();
    let customer = evil_rabbit().id.to_string();

    for amount in ["-5", "abc", ""] {
        let state = failed(
            t.actions
                .create_invoice(form(&[
                    (field::CUSTOMER_ID, customer.as_str()),
                    (field::AMOUNT, amount),
                    (field::STATUS, "pending"),
                ]))
                .await,
        );
        assert_eq!(state.errors_for(field::AMOUNT), [AMOUNT_POSITIVE], "amount {:?}", amount);
        assert!(state.errors_for(field::CUSTOMER_ID).is_empty());
    }

    assert_eq!(t.store.write_calls(), 0);
}

#[tokio::test]
async fn oversized_amounts_report_the_upper_bound() {
    let t = test_actions();
    let customer = evil_rabbit().id.to_string();

    for amount in ["1e20", "1000000000000", "1e27"] {
        let state = failed(
            t.actions
                .create_invoice(form(&[
                    (field::CUSTOMER_ID, customer.as_str()),
                    (field::AMOUNT, amount),
                    (field::STATUS, "pending"),
                ]))
                .await,
        );
        assert_eq!(state.errors_for(field::AMOUNT), [AMOUNT_TOO_LARGE], "amount {:?}", amount);
    }

    let outcome = t
        .actions
        .create_invoice(form(&[
            (field::CUSTOMER_ID, customer.as_str()),
            (field::AMOUNT, "999999999999.99"),
            (field::STATUS, "pending"),
        ]))
        .await;
    assert!(outcome.is_success());
    assert_eq!(t.store.snapshot()[0].amount, 99_999_999_999_999);
}

#[tokio::test]
async fn create_store_failure_returns_message_only() {
    let t = test_actions();
    t.store.set_failing(true);
    let customer = evil_rabbit().id.to_string();

    let state = failed(
        t.actions
            .create_invoice(form(&[
                (field::CUSTOMER_ID, customer.as_str()),
                (field::AMOUNT, "10"),
                (field::STATUS, "paid"),
            ]))
            .await,
    );

    assert_eq!(state, FormState::failed(CREATE_DB_ERROR_MESSAGE));
    assert!(state.errors.is_none());
    assert!(t.revalidator.paths().is_empty());
    assert!(t.store.snapshot().is_empty());
}

#[tokio::test]
async fn unknown_customer_is_a_store_failure() {
    let t = test_actions();

    let state = failed(
        t.actions
            .create_invoice(form(&[
                (field::CUSTOMER_ID, "c1"),
                (field::AMOUNT, "10"),
                (field::STATUS, "paid"),
            ]))
            .await,
    );

    assert_eq!(state, FormState::failed(CREATE_DB_ERROR_MESSAGE));
    assert_eq!(t.store.write_calls(), 1);
}

#[tokio::test]
async fn update_overwrites_every_field() {
    let t = test_actions();
    let invoice = existing_invoice(evil_rabbit().id);
    t.store.seed_invoice(invoice.clone());
    let customer = lee_robinson().id.to_string();

    let outcome = t
        .actions
        .update_invoice(
            invoice.id,
            form(&[
                (field::CUSTOMER_ID, customer.as_str()),
                (field::AMOUNT, "99.99"),
                (field::STATUS, "pending"),
            ]),
        )
        .await;

    assert_eq!(outcome, MutationOutcome::Redirect(INVOICES_PATH.to_string()));
    let rows = t.store.snapshot();
    assert_eq!(rows[0].id, invoice.id);
    assert_eq!(rows[0].customer_id, lee_robinson().id);
    assert_eq!(rows[0].amount, 9999);
    assert_eq!(rows[0].status, "pending");
    assert_eq!(rows[0].date, today());
    assert_eq!(t.revalidator.paths().len(), 1);
}

#[tokio::test]
async fn update_of_missing_invoice_still_redirects() {
    let t = test_actions();
    let customer = evil_rabbit().id.to_string();

    let outcome = t
        .actions
        .update_invoice(
            Uuid::new_v4(),
            form(&[
                (field::CUSTOMER_ID, customer.as_str()),
                (field::AMOUNT, "1"),
                (field::STATUS, "paid"),
            ]),
        )
        .await;

    assert_eq!(outcome, MutationOutcome::Redirect(INVOICES_PATH.to_string()));
    assert!(t.store.snapshot().is_empty());
    assert_eq!(t.revalidator.paths(), vec![INVOICES_PATH.to_string()]);
}

#[tokio::test]
async fn invalid_update_uses_update_message() {
    let t = test_actions();
    let invoice = existing_invoice(evil_rabbit().id);
    t.store.seed_invoice(invoice.clone());

    let state = failed(
        t.actions
            .update_invoice(invoice.id, form(&[(field::STATUS, "paid")]))
            .await,
    );

    assert_eq!(state.message.as_deref(), Some(UPDATE_INVALID_MESSAGE));
    assert_eq!(state.errors_for(field::CUSTOMER_ID), [CUSTOMER_REQUIRED]);
    assert_eq!(t.store.write_calls(), 0);
    assert_eq!(t.store.snapshot()[0], invoice);
}

#[tokio::test]
async fn update_store_failure_returns_message_only() {
    let t = test_actions();
    t.store.set_failing(true);
    let customer = evil_rabbit().id.to_string();

    let state = failed(
        t.actions
            .update_invoice(
                Uuid::new_v4(),
                form(&[
                    (field::CUSTOMER_ID, customer.as_str()),
                    (field::AMOUNT, "3"),
                    (field::STATUS, "paid"),
                ]),
            )
            .await,
    );

    assert_eq!(state, FormState::failed(UPDATE_DB_ERROR_MESSAGE));
    assert!(t.revalidator.paths().is_empty());
}

#[tokio::test]
async fn delete_removes_row_and_refreshes() {
    let t = test_actions();
    let keep = existing_invoice(evil_rabbit().id);
    let remove = existing_invoice(lee_robinson().id);
    t.store.seed_invoice(keep.clone());
    t.store.seed_invoice(remove.clone());

    let outcome = t.actions.delete_invoice(remove.id).await;

    assert_eq!(outcome, MutationOutcome::Refreshed);
    assert_eq!(t.store.snapshot(), vec![keep]);
    assert_eq!(t.revalidator.paths(), vec![INVOICES_PATH.to_string()]);
}

#[tokio::test]
async fn delete_of_absent_invoice_is_not_an_error() {
    let t = test_actions();

    let outcome = t.actions.delete_invoice(Uuid::new_v4()).await;

    assert_eq!(outcome, MutationOutcome::Refreshed);
    assert_eq!(t.revalidator.paths().len(), 1);
}

#[tokio::test]
async fn delete_failure_is_reported_and_listing_still_revalidated() {
    let t = test_actions();
    let invoice = existing_invoice(evil_rabbit().id);
    t.store.seed_invoice(invoice.clone());
    t.store.set_failing(true);

    let state = failed(t.actions.delete_invoice(invoice.id).await);

    assert_eq!(state, FormState::failed(DELETE_DB_ERROR_MESSAGE));
    assert_eq!(t.store.snapshot(), vec![invoice]);
    assert_eq!(t.revalidator.paths(), vec![INVOICES_PATH.to_string()]);
}
