//! Invoice form schema: field constraints and the messages shown for them.
//!
//! Create and update share one shape; the invoice id travels in the URL,
//! never in the form body.

use crate::models::{field, FieldErrors, FormFields, InvoiceInput, InvoiceStatus};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::borrow::Cow;
use std::num::IntErrorKind;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

pub const CUSTOMER_REQUIRED: &str = "Please select a customer.";
pub const AMOUNT_POSITIVE: &str = "Please enter an amount greater than $0.";
pub const AMOUNT_TOO_LARGE: &str = "Please enter an amount of $999,999,999,999.99 or less.";
pub const STATUS_REQUIRED: &str = "Please select an invoice status.";
pub const DATE_INVALID: &str = "Invalid invoice date.";

/// Largest accepted amount, in minor units.
pub const MAX_AMOUNT_CENTS: i64 = 99_999_999_999_999;

/// Typed view of a normalized invoice submission.
#[derive(Debug, Clone, Validate)]
pub struct InvoiceSchema {
    #[validate(length(min = 1, message = "Please select a customer."))]
    pub customer_id: String,

    /// Minor units, coerced from the normalized form value.
    #[validate(range(min = 1, message = "Please enter an amount greater than $0."))]
    pub amount: i64,

    #[validate(custom(function = "validate_status"))]
    pub status: String,

    pub date: String,
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    match InvoiceStatus::parse(status) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("status").with_message(Cow::Borrowed(STATUS_REQUIRED))),
    }
}

impl InvoiceSchema {
    /// Coerce raw form strings into the schema's types. A missing or
    /// non-numeric amount becomes 0 so that it fails the amount rule; one
    /// outside `i64` saturates so that it fails the matching bound.
    pub fn coerce(fields: &FormFields) -> Self {
        Self {
            customer_id: fields.value(field::CUSTOMER_ID).to_string(),
            amount: coerce_amount(fields.value(field::AMOUNT)),
            status: fields.value(field::STATUS).to_string(),
            date: fields.value(field::DATE).to_string(),
        }
    }

    /// Schema rules plus the upper bound on the amount.
    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };
        if self.amount > MAX_AMOUNT_CENTS {
            errors
                .entry(field::AMOUNT.to_string())
                .or_default()
                .push(AMOUNT_TOO_LARGE.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_input(self) -> Result<InvoiceInput, FieldErrors> {
        let status = InvoiceStatus::parse(&self.status)
            .ok_or_else(|| single_error(field::STATUS, STATUS_REQUIRED))?;
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| single_error(field::DATE, DATE_INVALID))?;

        Ok(InvoiceInput {
            customer_id: self.customer_id,
            amount: self.amount,
            status,
            date,
        })
    }
}

/// Validate a normalized submission, returning the typed record or the
/// messages keyed by form field name.
pub fn safe_parse(fields: &FormFields) -> Result<InvoiceInput, FieldErrors> {
    let schema = InvoiceSchema::coerce(fields);
    schema.check()?;
    schema.into_input()
}

/// Re-key validator errors by the names the form posts.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (name, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect::<Vec<_>>();
        out.entry(form_field_name(&name).to_string())
            .or_default()
            .extend(messages);
    }
    out
}

fn form_field_name(name: &str) -> &str {
    match name {
        "customer_id" => field::CUSTOMER_ID,
        "amount" => field::AMOUNT,
        "status" => field::STATUS,
        "date" => field::DATE,
        other => other,
    }
}

fn coerce_amount(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(amount) => amount,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 0,
        },
    }
}

fn single_error(name: &str, message: &str) -> FieldErrors {
    FieldErrors::from([(name.to_string(), vec![message.to_string()])])
}

/// Convert a whole-unit amount such as `"15.50"` to minor units.
///
/// Decimal arithmetic, half away from zero. Returns `None` for input that
/// is not a number. Amounts too large for the multiplication saturate at
/// the decimal range, keeping their sign.
pub fn to_minor_units(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Decimal::ZERO);
    }

    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;

    let cents = amount.checked_mul(Decimal::ONE_HUNDRED).unwrap_or(
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        },
    );
    Some(
        cents
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .normalize(),
    )
}
