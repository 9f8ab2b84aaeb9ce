//! Category and cost center registries.

use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CostCenter, EngineError, ResultEngine, categories, cost_centers, entries,
};

use super::{Engine, normalize_label, with_tx};

impl Engine {
    /// Categories ordered by label.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Label)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn category(&self, id: Uuid) -> ResultEngine<Category> {
        categories::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Category::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")))
    }

    /// Creates a category. Labels are trimmed and must be unique.
    pub async fn create_category(&self, label: &str) -> ResultEngine<Category> {
        let label = normalize_label(label, "category", categories::LABEL_MAX_CHARS)?;
        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::Label.eq(label.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(label));
            }
            let category = Category::new(label);
            categories::ActiveModel::from(&category).insert(&db_tx).await?;
            tracing::info!(id = %category.id, label = %category.label, "category created");
            Ok(category)
        })
    }

    /// Deletes a category that no entry references.
    pub async fn delete_category(&self, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")))?;
            let used = entries::Entity::find()
                .filter(entries::Column::CategoryId.eq(id))
                .count(&db_tx)
                .await?;
            if used > 0 {
                return Err(EngineError::InUse(format!(
                    "category '{}' is used by {used} entries",
                    model.label
                )));
            }
            categories::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!(%id, "category deleted");
            Ok(())
        })
    }

    /// Cost centers ordered by label.
    pub async fn list_cost_centers(&self) -> ResultEngine<Vec<CostCenter>> {
        let models = cost_centers::Entity::find()
            .order_by_asc(cost_centers::Column::Label)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(CostCenter::from).collect())
    }

    pub async fn cost_center(&self, id: Uuid) -> ResultEngine<CostCenter> {
        cost_centers::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(CostCenter::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("cost center {id}")))
    }

    pub async fn create_cost_center(&self, label: &str) -> ResultEngine<CostCenter> {
        let label = normalize_label(label, "cost center", cost_centers::LABEL_MAX_CHARS)?;
        with_tx!(self, |db_tx| {
            let existing = cost_centers::Entity::find()
                .filter(cost_centers::Column::Label.eq(label.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(label));
            }
            let cost_center = CostCenter::new(label);
            cost_centers::ActiveModel::from(&cost_center)
                .insert(&db_tx)
                .await?;
            tracing::info!(id = %cost_center.id, label = %cost_center.label, "cost center created");
            Ok(cost_center)
        })
    }

    pub async fn delete_cost_center(&self, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = cost_centers::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("cost center {id}")))?;
            let used = entries::Entity::find()
                .filter(entries::Column::CostCenterId.eq(id))
                .count(&db_tx)
                .await?;
            if used > 0 {
                return Err(EngineError::InUse(format!(
                    "cost center '{}' is used by {used} entries",
                    model.label
                )));
            }
            cost_centers::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!(%id, "cost center deleted");
            Ok(())
        })
    }

    /// Loads the category and cost center referenced by an entry.
    pub(super) async fn resolve_references<C: ConnectionTrait>(
        db: &C,
        category_id: Uuid,
        cost_center_id: Option<Uuid>,
    ) -> ResultEngine<(Option<Category>, Option<Option<CostCenter>>)> {
        let category = categories::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .map(Category::from);
        let cost_center = match cost_center_id {
            None => Some(None),
            Some(id) => cost_centers::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(|model| Some(CostCenter::from(model))),
        };
        Ok((category, cost_center))
    }
}
