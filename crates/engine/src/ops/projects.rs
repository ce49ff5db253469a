use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, NewProjectCmd, Project, ResultEngine, UpdateProjectCmd,
    owned::{owned_by, require_owned},
    projects, tasks,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Projects of `user_id`, most recently updated first.
    pub async fn list_projects(
        &self,
        user_id: &str,
        is_active: Option<bool>,
    ) -> ResultEngine<Vec<Project>> {
        let mut query = owned_by::<projects::Entity>(user_id);
        if let Some(is_active) = is_active {
            query = query.filter(projects::Column::IsActive.eq(is_active));
        }
        let models = query
            .order_by_desc(projects::Column::UpdatedAt)
            .order_by_desc(projects::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Project::from).collect())
    }

    pub async fn project(&self, user_id: &str, project_id: i32) -> ResultEngine<Project> {
        let model =
            require_owned::<projects::Entity, _>(&self.database, project_id, user_id).await?;
        Ok(model.into())
    }

    pub async fn create_project(&self, cmd: NewProjectCmd) -> ResultEngine<Project> {
        let name = normalize_required_name(&cmd.name, "project")?;
        let now = Utc::now();
        let model = projects::ActiveModel {
            user_id: ActiveValue::Set(cmd.user_id.clone()),
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
            end_date: ActiveValue::Set(cmd.end_date),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            is_active: ActiveValue::Set(cmd.is_active.unwrap_or(true)),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;
        tracing::debug!(user_id = %cmd.user_id, project_id = model.id, "created project");
        Ok(model.into())
    }

    pub async fn update_project(
        &self,
        user_id: &str,
        project_id: i32,
        cmd: UpdateProjectCmd,
    ) -> ResultEngine<Project> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "project"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = require_owned::<projects::Entity, _>(&db_tx, project_id, user_id).await?;
            let mut active: projects::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = &cmd.description {
                active.description = ActiveValue::Set(normalize_optional_text(description.as_deref()));
            }
            if let Some(end_date) = cmd.end_date {
                active.end_date = ActiveValue::Set(end_date);
            }
            if let Some(is_active) = cmd.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok::<_, EngineError>(Project::from(model))
        })
    }

    /// Deletes a project together with its tasks.
    pub async fn delete_project(&self, user_id: &str, project_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| self
            .delete_project_in(&db_tx, user_id, project_id)
            .await)
    }

    async fn delete_project_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        project_id: i32,
    ) -> ResultEngine<()> {
        let model = require_owned::<projects::Entity, _>(db_tx, project_id, user_id).await?;
        tasks::Entity::delete_many()
            .filter(tasks::Column::ProjectId.eq(model.id))
            .exec(db_tx)
            .await?;
        projects::Entity::delete_by_id(model.id).exec(db_tx).await?;
        tracing::debug!(user_id, project_id, "deleted project");
        Ok(())
    }

    /// Bumps `updated_at` of a project whose tasks changed.
    pub(super) async fn touch_project(
        &self,
        db_tx: &DatabaseTransaction,
        project: projects::Model,
    ) -> ResultEngine<()> {
        let mut active: projects::ActiveModel = project.into();
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(db_tx).await?;
        Ok(())
    }
}
