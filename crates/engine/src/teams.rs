//! Teams: an owner plus a set of member users (many-to-many through
//! [`team_members`](crate::team_members)).

use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::owned::OwnedEntity;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: i32,
    pub user_id: String,
    /// Member usernames, sorted.
    pub members: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_members::Entity")]
    Members,
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl OwnedEntity for Entity {
    const LABEL: &'static str = "team";

    fn owner_column() -> Self::Column {
        Column::UserId
    }
}
