use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub label: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub label: String,
    }
}

pub mod cost_center {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CostCenterNew {
        pub label: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CostCenterView {
        pub id: Uuid,
        pub label: String,
    }
}

pub mod entry {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMethod {
        Pix,
        Cash,
        Credit,
        Debit,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        Receivable,
        Payable,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryStatus {
        Open,
        Settled,
    }

    /// Payload for creating or fully replacing an entry.
    ///
    /// Amounts are signed cents: positive for receivables, negative for
    /// payables. `received_minor` must carry the same sign.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct EntryNew {
        pub description: String,
        pub category_id: Uuid,
        pub cost_center_id: Option<Uuid>,
        pub payment_method: PaymentMethod,
        /// `YYYY-MM-DD`.
        pub due_date: NaiveDate,
        pub original_minor: i64,
        pub received_minor: Option<i64>,
        pub payment_date: Option<NaiveDate>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: Uuid,
        pub description: String,
        pub kind: EntryKind,
        pub status: EntryStatus,
        pub category: category::CategoryView,
        pub cost_center: Option<cost_center::CostCenterView>,
        pub payment_method: PaymentMethod,
        pub due_date: NaiveDate,
        pub original_minor: i64,
        pub received_minor: Option<i64>,
        pub outstanding_minor: i64,
        pub payment_date: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryFilter {
        #[default]
        All,
        Receivables,
        Payables,
        Open,
        Settled,
    }

    /// Query string of `GET /entries`.
    ///
    /// `page` is kept as text: anything that is not a positive number is read
    /// as the first page.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryListQuery {
        pub q: Option<String>,
        pub page: Option<String>,
        pub filter: Option<EntryFilter>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryPage {
        pub entries: Vec<EntryView>,
        pub page: u64,
        pub total_pages: u64,
        pub total_entries: u64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecentQuery {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        pub entries: Vec<EntryView>,
    }

    /// Body of `POST /entries/{id}/pay`. Missing fields take the original
    /// value and today's date.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MarkPaid {
        pub amount_minor: Option<i64>,
        pub payment_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub receivables_minor: i64,
        /// Absolute value.
        pub payables_minor: i64,
        pub result_minor: i64,
        pub outstanding_minor: i64,
    }
}

pub mod error {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldErrorView {
        pub field: String,
        pub message: String,
    }

    /// JSON body of every non-2xx response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub fields: Vec<FieldErrorView>,
    }
}
