//! Entry validation rules shared by every write path.
//!
//! [`validate_entry`] is pure: it only looks at the submitted values. The
//! engine adds reference checks (category / cost center existence) on top
//! and merges everything into one [`FieldErrors`].

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Money, PaymentMethod};

pub const DESCRIPTION_MAX_CHARS: usize = 255;

/// Field names in declaration order. Errors are reported in this order.
pub const FIELDS: [&str; 8] = [
    "description",
    "category",
    "cost_center",
    "payment_method",
    "due_date",
    "original_value",
    "received_value",
    "payment_date",
];

pub(crate) const MSG_REQUIRED: &str = "Este campo é obrigatório.";
pub(crate) const MSG_INVALID_CHOICE: &str = "Selecione uma opção válida.";
const MSG_ZERO_VALUE: &str = "O valor original não pode ser zero.";
const MSG_SIGN_MISMATCH: &str = "Use o mesmo sinal do valor original.";
const MSG_TOO_LARGE: &str = "Certifique-se de que não tenha mais de 12 dígitos no total.";
const MSG_MISSING_RECEIVED: &str = "Informe o valor recebido/pago ao definir a data de pagamento.";

/// The values submitted for one entry, already typed and signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryInput {
    pub description: String,
    pub category_id: Uuid,
    pub cost_center_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub due_date: NaiveDate,
    pub original_value: Money,
    pub received_value: Option<Money>,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-scoped validation failures, possibly several per field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns the messages reported against `field`.
    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    /// Orders errors by field declaration order, keeping insertion order
    /// within a field.
    pub fn sorted(mut self) -> Self {
        self.0.sort_by_key(|e| {
            FIELDS
                .iter()
                .position(|f| *f == e.field)
                .unwrap_or(FIELDS.len())
        });
        self
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Checks the value rules of an entry.
///
/// - `description` is required (after trimming) and at most 255 chars;
/// - `original_value` must not be zero;
/// - `original_value` and `received_value` fit in twelve digits;
/// - a non-zero `received_value` must carry the sign of `original_value`;
/// - a `payment_date` requires a non-zero `received_value`.
pub fn validate_entry(input: &EntryInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let description = input.description.trim();
    if description.is_empty() {
        errors.push("description", MSG_REQUIRED);
    } else if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push(
            "description",
            format!("Certifique-se de que o valor tenha no máximo {DESCRIPTION_MAX_CHARS} caracteres."),
        );
    }

    let original_ok = if input.original_value.is_zero() {
        errors.push("original_value", MSG_ZERO_VALUE);
        false
    } else if !input.original_value.is_within_limit() {
        errors.push("original_value", MSG_TOO_LARGE);
        false
    } else {
        true
    };

    if let Some(received) = input.received_value
        && !received.is_within_limit()
    {
        errors.push("received_value", MSG_TOO_LARGE);
    }

    let received = input.received_value.filter(|v| !v.is_zero());
    if let Some(received) = received
        && original_ok
        && input.original_value.is_positive() != received.is_positive()
    {
        errors.push("received_value", MSG_SIGN_MISMATCH);
    }

    if input.payment_date.is_some() && received.is_none() {
        errors.push("received_value", MSG_MISSING_RECEIVED);
    }

    errors.into_result()
}
