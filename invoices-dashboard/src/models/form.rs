//! Raw form submissions and the state rendered back into a form.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Form field names as posted by the invoice forms.
pub mod field {
    pub const CUSTOMER_ID: &str = "customerId";
    pub const AMOUNT: &str = "amount";
    pub const STATUS: &str = "status";
    pub const DATE: &str = "date";
}

/// Submitted form entries flattened into a plain mapping.
///
/// When a key is posted more than once the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value of `key`, or the empty string when it was not submitted.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Field name -> human readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// What a failed mutation hands back to the form: inline field errors
/// and/or a summary message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FormState {
    /// Validation failure: field errors plus a summary.
    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors: Some(errors),
            message: Some(message.into()),
        }
    }

    /// Message-only failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: Some(message.into()),
        }
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors
            .as_ref()
            .and_then(|errors| errors.get(field))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
