//! Entry lifecycle: create, edit, settle, clone, delete, listing and totals.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Category, CostCenter, Entry, EngineError, Money, ResultEngine, categories, cost_centers,
    entries,
    validation::{EntryInput, FieldErrors, MSG_INVALID_CHOICE, validate_entry},
};

use super::{Engine, with_tx};

/// Entries per page in [`Engine::list_entries`].
pub const PAGE_SIZE: u64 = 10;
/// Upper bound for [`Engine::list_recent_entries`].
pub const RECENT_MAX: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryFilter {
    #[default]
    All,
    Receivables,
    Payables,
    Open,
    Settled,
}

/// One page of the entry listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPage {
    pub entries: Vec<Entry>,
    /// 1-based page actually returned.
    pub page: u64,
    pub total_pages: u64,
    pub total_entries: u64,
}

/// Ledger totals.
///
/// `payables` is reported as an absolute value. `result` sums what was
/// actually received or paid on settled entries. `outstanding` is what is
/// still to be received on receivables, never below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub receivables: Money,
    pub payables: Money,
    pub result: Money,
    pub outstanding: Money,
}

trait EntryQueryExt {
    fn apply_entry_filter(self, filter: EntryFilter) -> Self;
    fn apply_search(self, search: &str) -> Self;
}

impl EntryQueryExt for Select<entries::Entity> {
    fn apply_entry_filter(self, filter: EntryFilter) -> Self {
        match filter {
            EntryFilter::All => self,
            EntryFilter::Receivables => self.filter(entries::Column::OriginalValue.gt(0)),
            EntryFilter::Payables => self.filter(entries::Column::OriginalValue.lt(0)),
            EntryFilter::Open => self.filter(entries::Column::PaymentDate.is_null()),
            EntryFilter::Settled => self.filter(entries::Column::PaymentDate.is_not_null()),
        }
    }

    fn apply_search(self, search: &str) -> Self {
        let search = search.trim();
        if search.is_empty() {
            self
        } else {
            self.filter(entries::Column::Description.contains(search))
        }
    }
}

impl Engine {
    /// Validates `input` and stores it as a new entry.
    pub async fn create_entry(&self, input: &EntryInput) -> ResultEngine<Entry> {
        with_tx!(self, |db_tx| {
            let (category, cost_center) = Self::check_entry(&db_tx, input).await?;
            let now = Utc::now();
            let model = entries::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                description: ActiveValue::Set(input.description.trim().to_string()),
                category_id: ActiveValue::Set(input.category_id),
                cost_center_id: ActiveValue::Set(input.cost_center_id),
                payment_method: ActiveValue::Set(input.payment_method.label().to_string()),
                due_date: ActiveValue::Set(input.due_date),
                original_value: ActiveValue::Set(input.original_value.minor()),
                received_value: ActiveValue::Set(input.received_value.map(Money::minor)),
                payment_date: ActiveValue::Set(input.payment_date),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(id = %model.id, value = model.original_value, "entry created");
            Entry::from_model(model, category, cost_center)
        })
    }

    /// Replaces every user field of an entry. Same rules as creation.
    pub async fn update_entry(&self, id: Uuid, input: &EntryInput) -> ResultEngine<Entry> {
        with_tx!(self, |db_tx| {
            let existing = Self::entry_model(&db_tx, id).await?;
            let (category, cost_center) = Self::check_entry(&db_tx, input).await?;
            let mut active: entries::ActiveModel = existing.into();
            active.description = ActiveValue::Set(input.description.trim().to_string());
            active.category_id = ActiveValue::Set(input.category_id);
            active.cost_center_id = ActiveValue::Set(input.cost_center_id);
            active.payment_method = ActiveValue::Set(input.payment_method.label().to_string());
            active.due_date = ActiveValue::Set(input.due_date);
            active.original_value = ActiveValue::Set(input.original_value.minor());
            active.received_value = ActiveValue::Set(input.received_value.map(Money::minor));
            active.payment_date = ActiveValue::Set(input.payment_date);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            tracing::info!(%id, "entry updated");
            Entry::from_model(model, category, cost_center)
        })
    }

    pub async fn entry(&self, id: Uuid) -> ResultEngine<Entry> {
        let model = Self::entry_model(&self.database, id).await?;
        let mut hydrated = Self::hydrate(&self.database, vec![model]).await?;
        hydrated
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound(format!("entry {id}")))
    }

    pub async fn delete_entry(&self, id: Uuid) -> ResultEngine<()> {
        let result = entries::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("entry {id}")));
        }
        tracing::info!(%id, "entry deleted");
        Ok(())
    }

    /// Copies every user field of an entry into a new one.
    pub async fn clone_entry(&self, id: Uuid) -> ResultEngine<Entry> {
        let source = self.entry(id).await?;
        let input = EntryInput {
            description: source.description,
            category_id: source.category.id,
            cost_center_id: source.cost_center.map(|c| c.id),
            payment_method: source.payment_method,
            due_date: source.due_date,
            original_value: source.original_value,
            received_value: source.received_value,
            payment_date: source.payment_date,
        };
        self.create_entry(&input).await
    }

    /// Settles an entry. `amount` defaults to the original value.
    pub async fn mark_as_paid(
        &self,
        id: Uuid,
        amount: Option<Money>,
        date: NaiveDate,
    ) -> ResultEngine<Entry> {
        let entry = self.entry(id).await?;
        let input = EntryInput {
            description: entry.description,
            category_id: entry.category.id,
            cost_center_id: entry.cost_center.map(|c| c.id),
            payment_method: entry.payment_method,
            due_date: entry.due_date,
            original_value: entry.original_value,
            received_value: Some(amount.unwrap_or(entry.original_value)),
            payment_date: Some(date),
        };
        self.update_entry(id, &input).await
    }

    /// The latest created entries, newest first. `limit` is clamped to
    /// `1..=RECENT_MAX`.
    pub async fn list_recent_entries(&self, limit: u64) -> ResultEngine<Vec<Entry>> {
        let models = entries::Entity::find()
            .order_by_desc(entries::Column::CreatedAt)
            .order_by_desc(entries::Column::Id)
            .limit(limit.clamp(1, RECENT_MAX))
            .all(&self.database)
            .await?;
        Self::hydrate(&self.database, models).await
    }

    /// Pages through entries matching `search` (case-insensitive contains on
    /// the description) and `filter`, ordered by payment date then
    /// description.
    ///
    /// A page below 1 is read as the first page, a page past the end as the
    /// last one.
    pub async fn list_entries(
        &self,
        search: &str,
        filter: EntryFilter,
        page: u64,
    ) -> ResultEngine<EntryPage> {
        let query = entries::Entity::find()
            .apply_search(search)
            .apply_entry_filter(filter);
        let total_entries = query.clone().count(&self.database).await?;
        let total_pages = total_entries.div_ceil(PAGE_SIZE).max(1);
        let page = page.clamp(1, total_pages);

        let models = query
            .order_by_asc(entries::Column::PaymentDate)
            .order_by_asc(entries::Column::Description)
            .order_by_asc(entries::Column::Id)
            .offset((page - 1) * PAGE_SIZE)
            .limit(PAGE_SIZE)
            .all(&self.database)
            .await?;

        Ok(EntryPage {
            entries: Self::hydrate(&self.database, models).await?,
            page,
            total_pages,
            total_entries,
        })
    }

    pub async fn totals(&self) -> ResultEngine<Totals> {
        let receivables =
            Self::sum(&self.database, entries::Column::OriginalValue, EntryFilter::Receivables)
                .await?;
        let payables =
            Self::sum(&self.database, entries::Column::OriginalValue, EntryFilter::Payables)
                .await?;
        let result =
            Self::sum(&self.database, entries::Column::ReceivedValue, EntryFilter::Settled)
                .await?;
        let received_on_receivables =
            Self::sum(&self.database, entries::Column::ReceivedValue, EntryFilter::Receivables)
                .await?;

        let outstanding = receivables.saturating_sub(received_on_receivables);
        Ok(Totals {
            receivables,
            payables: payables.saturating_abs(),
            result,
            outstanding: if outstanding.is_negative() {
                Money::ZERO
            } else {
                outstanding
            },
        })
    }

    async fn sum<C: ConnectionTrait>(
        db: &C,
        column: entries::Column,
        filter: EntryFilter,
    ) -> ResultEngine<Money> {
        let total: Option<Option<i64>> = entries::Entity::find()
            .apply_entry_filter(filter)
            .select_only()
            .column_as(Expr::col(column).sum(), "total")
            .into_tuple()
            .one(db)
            .await?;
        Ok(Money::new(total.flatten().unwrap_or(0)))
    }

    async fn entry_model<C: ConnectionTrait>(db: &C, id: Uuid) -> ResultEngine<entries::Model> {
        entries::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("entry {id}")))
    }

    /// Runs the value rules and the reference checks, returning the resolved
    /// references when everything passes.
    async fn check_entry<C: ConnectionTrait>(
        db: &C,
        input: &EntryInput,
    ) -> ResultEngine<(Category, Option<CostCenter>)> {
        let mut errors = validate_entry(input).err().unwrap_or_default();
        let (category, cost_center) =
            Self::resolve_references(db, input.category_id, input.cost_center_id).await?;
        if category.is_none() {
            errors.push("category", MSG_INVALID_CHOICE);
        }
        if cost_center.is_none() {
            errors.push("cost_center", MSG_INVALID_CHOICE);
        }

        match (category, cost_center) {
            (Some(category), Some(cost_center)) if errors.is_empty() => {
                Ok((category, cost_center))
            }
            _ => {
                let errors: FieldErrors = errors.sorted();
                tracing::debug!(%errors, "entry rejected");
                Err(EngineError::Validation(errors))
            }
        }
    }

    /// Attaches categories and cost centers to entry rows, keeping row order.
    async fn hydrate<C: ConnectionTrait>(
        db: &C,
        models: Vec<entries::Model>,
    ) -> ResultEngine<Vec<Entry>> {
        let category_ids: Vec<Uuid> = models.iter().map(|m| m.category_id).collect();
        let cost_center_ids: Vec<Uuid> = models.iter().filter_map(|m| m.cost_center_id).collect();

        if models.is_empty() {
            return Ok(Vec::new());
        }
        let categories: HashMap<Uuid, Category> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, Category::from(m)))
            .collect();
        let cost_centers: HashMap<Uuid, CostCenter> = if cost_center_ids.is_empty() {
            HashMap::new()
        } else {
            cost_centers::Entity::find()
                .filter(cost_centers::Column::Id.is_in(cost_center_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|m| (m.id, CostCenter::from(m)))
                .collect()
        };

        models
            .into_iter()
            .map(|model| {
                let category = categories
                    .get(&model.category_id)
                    .cloned()
                    .ok_or_else(|| {
                        EngineError::KeyNotFound(format!("category {}", model.category_id))
                    })?;
                let cost_center = match model.cost_center_id {
                    None => None,
                    Some(id) => Some(cost_centers.get(&id).cloned().ok_or_else(|| {
                        EngineError::KeyNotFound(format!("cost center {id}"))
                    })?),
                };
                Entry::from_model(model, category, cost_center)
            })
            .collect()
    }
}
