//! Projects owned by a user. A project groups [`Task`](crate::Task)s.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::owned::OwnedEntity;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: i32,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// Refreshed whenever the project or one of its tasks changes.
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub end_date: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl OwnedEntity for Entity {
    const LABEL: &'static str = "project";

    fn owner_column() -> Self::Column {
        Column::UserId
    }
}

impl From<Model> for Project {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            end_date: model.end_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
            is_active: model.is_active,
        }
    }
}
