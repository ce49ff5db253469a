//! Categories owned by a user.
//!
//! Deleting a category never deletes transactions: their `category_id` is
//! cleared instead.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::owned::OwnedEntity;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl OwnedEntity for Entity {
    const LABEL: &'static str = "category";

    fn owner_column() -> Self::Column {
        Column::UserId
    }
}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}
