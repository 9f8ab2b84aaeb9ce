//! The module contains the `Entry` type, one line of the ledger.
//!
//! Receivables and payables are both represented by `Entry`; the sign of
//! `original_value` tells them apart.
use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, CostCenter, EngineError, Money, entries};

/// How the entry was (or will be) paid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    Pix,
    Cash,
    Credit,
    Debit,
}

impl PaymentMethod {
    /// Every method, in the order offered to users.
    pub const ALL: [PaymentMethod; 4] = [Self::Pix, Self::Cash, Self::Credit, Self::Debit];

    /// Label shown to users and stored in the database.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::Cash => "Espécie",
            Self::Credit => "Crédito",
            Self::Debit => "Débito",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|method| method.label() == value)
            .ok_or_else(|| EngineError::KeyNotFound(format!("payment method {value}")))
    }
}

/// The side chosen by whoever records an entry: money coming in or going out.
///
/// Amounts are typed as positive magnitudes; the direction applies the
/// ledger sign convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Receiving,
    Paying,
}

impl Direction {
    /// Applies the sign convention: paying negates the magnitude.
    #[must_use]
    pub fn apply(self, magnitude: Money) -> Money {
        match self {
            Self::Receiving => magnitude,
            Self::Paying => -magnitude,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Receivable,
    Payable,
}

impl EntryKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Receivable => "Recebimento",
            Self::Payable => "Pagamento",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Open,
    Settled,
}

impl EntryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Em aberto",
            Self::Settled => "Liquidado",
        }
    }
}

/// One ledger line with its references resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: Uuid,
    pub description: String,
    pub category: Category,
    pub cost_center: Option<CostCenter>,
    pub payment_method: PaymentMethod,
    pub due_date: NaiveDate,
    pub original_value: Money,
    pub received_value: Option<Money>,
    pub payment_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    pub(crate) fn from_model(
        model: entries::Model,
        category: Category,
        cost_center: Option<CostCenter>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            id: model.id,
            description: model.description,
            category,
            cost_center,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            due_date: model.due_date,
            original_value: Money::new(model.original_value),
            received_value: model.received_value.map(Money::new),
            payment_date: model.payment_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    pub fn kind(&self) -> EntryKind {
        if self.original_value.is_negative() {
            EntryKind::Payable
        } else {
            EntryKind::Receivable
        }
    }

    pub fn status(&self) -> EntryStatus {
        if self.payment_date.is_some() {
            EntryStatus::Settled
        } else {
            EntryStatus::Open
        }
    }

    /// What is still to be received (or paid), signed like `original_value`.
    pub fn outstanding_value(&self) -> Money {
        self.original_value - self.received_value.unwrap_or(Money::ZERO)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.description,
            self.due_date.format("%d/%m/%Y")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(original: i64, received: Option<i64>, paid: bool) -> Entry {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        Entry {
            id: Uuid::new_v4(),
            description: "Aluguel".to_string(),
            category: Category {
                id: Uuid::new_v4(),
                label: "Moradia".to_string(),
            },
            cost_center: None,
            payment_method: PaymentMethod::Pix,
            due_date: date,
            original_value: Money::new(original),
            received_value: received.map(Money::new),
            payment_date: paid.then_some(date),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn kind_follows_value_sign() {
        assert_eq!(entry(100, None, false).kind(), EntryKind::Receivable);
        assert_eq!(entry(-100, None, false).kind(), EntryKind::Payable);
    }

    #[test]
    fn status_follows_payment_date() {
        assert_eq!(entry(100, None, false).status(), EntryStatus::Open);
        assert_eq!(entry(100, Some(100), true).status(), EntryStatus::Settled);
    }

    #[test]
    fn outstanding_subtracts_received() {
        assert_eq!(entry(-5000, None, false).outstanding_value(), Money::new(-5000));
        assert_eq!(
            entry(-5000, Some(-2000), true).outstanding_value(),
            Money::new(-3000)
        );
    }

    #[test]
    fn payment_method_round_trips_through_label() {
        for method in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::try_from(method.label()).unwrap(), method);
        }
        assert!(PaymentMethod::try_from("Boleto").is_err());
    }

    #[test]
    fn direction_applies_sign() {
        assert_eq!(Direction::Receiving.apply(Money::new(250)), Money::new(250));
        assert_eq!(Direction::Paying.apply(Money::new(250)), Money::new(-250));
    }
}
