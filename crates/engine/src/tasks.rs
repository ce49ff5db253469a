//! Tasks belong to a project; access is granted by owning the project.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "N")]
    NotStarted,
    #[serde(rename = "P")]
    InProgress,
    #[serde(rename = "R")]
    InReview,
    #[serde(rename = "C")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "N",
            Self::InProgress => "P",
            Self::InReview => "R",
            Self::Completed => "C",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "N" => Ok(Self::NotStarted),
            "P" => Ok(Self::InProgress),
            "R" => Ok(Self::InReview),
            "C" => Ok(Self::Completed),
            other => Err(EngineError::InvalidField {
                field: "status",
                message: format!("invalid task status: {other}"),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i32,
    pub project_id: i32,
    /// The user who created the task.
    pub user_id: String,
    /// The user the task is assigned to, if any.
    pub owner_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: u32,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub user_id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: i64,
    pub due_date: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Task {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let priority = u32::try_from(model.priority).map_err(|_| EngineError::InvalidField {
            field: "priority",
            message: format!("stored priority out of range: {}", model.priority),
        })?;
        Ok(Self {
            id: model.id,
            project_id: model.project_id,
            user_id: model.user_id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            status: TaskStatus::try_from(model.status.as_str())?,
            priority,
            due_date: model.due_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
