//! Cost centers group entries by project or activity. Optional on entries.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LABEL_MAX_CHARS: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostCenter {
    pub id: Uuid,
    pub label: String,
}

impl CostCenter {
    pub fn new(label: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cost_centers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CostCenter {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            label: value.label,
        }
    }
}

impl From<&CostCenter> for ActiveModel {
    fn from(value: &CostCenter) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            label: ActiveValue::Set(value.label.clone()),
        }
    }
}
