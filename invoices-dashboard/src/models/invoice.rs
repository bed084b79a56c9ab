//! Invoice model for the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }

    /// Strict parse: anything but the two known values is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvoiceStatus::Pending),
            "paid" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Minor units (cents).
    pub amount: i64,
    pub status: String,
    pub date: NaiveDate,
}

/// Invoice joined with its customer, as shown in the listing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InvoiceListItem {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: i64,
    pub status: String,
    pub date: NaiveDate,
}

/// Validated invoice fields, ready to be written by a create or an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceInput {
    /// Opaque customer reference; storage enforces that it exists.
    pub customer_id: String,
    /// Minor units (cents), always positive.
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Render minor units as a dollar amount, e.g. `1550` -> `$15.50`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, abs % 100)
}
