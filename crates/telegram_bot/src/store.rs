//! What the conversation needs from the ledger, and the errors it can get.

use std::future::Future;

use api_types::{
    category::CategoryView,
    cost_center::CostCenterView,
    entry::{EntryNew, EntryView},
    error::FieldErrorView,
};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    /// The ledger refused the entry; one item per failing field.
    #[error("invalid entry")]
    Invalid(Vec<FieldErrorView>),
}

/// Ledger operations used by the bot.
pub trait LedgerStore: Clone + Send + Sync + 'static {
    /// Categories ordered by label.
    fn list_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<CategoryView>, StoreError>> + Send;

    /// Cost centers ordered by label.
    fn list_cost_centers(
        &self,
    ) -> impl Future<Output = Result<Vec<CostCenterView>, StoreError>> + Send;

    fn create_entry(
        &self,
        entry: &EntryNew,
    ) -> impl Future<Output = Result<EntryView, StoreError>> + Send;

    /// Latest created entries, newest first.
    fn list_recent_entries(
        &self,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<EntryView>, StoreError>> + Send;
}
