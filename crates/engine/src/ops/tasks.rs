use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    EngineError, NewTaskCmd, ResultEngine, Task, UpdateTaskCmd,
    owned::require_owned,
    projects, tasks,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, users::require_users, with_tx};

impl Engine {
    /// Tasks of a project owned by `user_id`, most recently updated first.
    pub async fn list_tasks(&self, user_id: &str, project_id: i32) -> ResultEngine<Vec<Task>> {
        let project =
            require_owned::<projects::Entity, _>(&self.database, project_id, user_id).await?;
        tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(project.id))
            .order_by_desc(tasks::Column::UpdatedAt)
            .order_by_desc(tasks::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    pub async fn task(&self, user_id: &str, project_id: i32, task_id: i32) -> ResultEngine<Task> {
        let project =
            require_owned::<projects::Entity, _>(&self.database, project_id, user_id).await?;
        let model = find_task(&self.database, project.id, task_id).await?;
        Task::try_from(model)
    }

    pub async fn create_task(&self, cmd: NewTaskCmd) -> ResultEngine<Task> {
        let name = normalize_required_name(&cmd.name, "task")?;
        with_tx!(self, |db_tx| self.create_task_in(&db_tx, &cmd, name).await)
    }

    async fn create_task_in(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &NewTaskCmd,
        name: String,
    ) -> ResultEngine<Task> {
        let project =
            require_owned::<projects::Entity, _>(db_tx, cmd.project_id, &cmd.user_id).await?;
        let owner = normalize_optional_text(cmd.owner.as_deref());
        if let Some(owner) = &owner {
            require_users(db_tx, "owner", std::slice::from_ref(owner)).await?;
        }

        let now = Utc::now();
        let model = tasks::ActiveModel {
            project_id: ActiveValue::Set(project.id),
            user_id: ActiveValue::Set(cmd.user_id.clone()),
            owner_id: ActiveValue::Set(owner),
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
            status: ActiveValue::Set(cmd.status.unwrap_or_default().as_str().to_string()),
            priority: ActiveValue::Set(i64::from(cmd.priority.unwrap_or(0))),
            due_date: ActiveValue::Set(cmd.due_date),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(db_tx)
        .await?;
        self.touch_project(db_tx, project).await?;

        tracing::debug!(
            user_id = %cmd.user_id,
            project_id = cmd.project_id,
            task_id = model.id,
            "created task"
        );
        Task::try_from(model)
    }

    pub async fn update_task(
        &self,
        user_id: &str,
        project_id: i32,
        task_id: i32,
        cmd: UpdateTaskCmd,
    ) -> ResultEngine<Task> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "task"))
            .transpose()?;
        with_tx!(self, |db_tx| self
            .update_task_in(&db_tx, user_id, project_id, task_id, name, &cmd)
            .await)
    }

    async fn update_task_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        project_id: i32,
        task_id: i32,
        name: Option<String>,
        cmd: &UpdateTaskCmd,
    ) -> ResultEngine<Task> {
        let project = require_owned::<projects::Entity, _>(db_tx, project_id, user_id).await?;
        let mut active: tasks::ActiveModel = find_task(db_tx, project.id, task_id).await?.into();

        if let Some(name) = name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = &cmd.description {
            active.description = ActiveValue::Set(normalize_optional_text(description.as_deref()));
        }
        if let Some(status) = cmd.status {
            active.status = ActiveValue::Set(status.as_str().to_string());
        }
        if let Some(priority) = cmd.priority {
            active.priority = ActiveValue::Set(i64::from(priority));
        }
        if let Some(due_date) = cmd.due_date {
            active.due_date = ActiveValue::Set(due_date);
        }
        if let Some(owner) = &cmd.owner {
            let owner = normalize_optional_text(owner.as_deref());
            if let Some(owner) = &owner {
                require_users(db_tx, "owner", std::slice::from_ref(owner)).await?;
            }
            active.owner_id = ActiveValue::Set(owner);
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        let model = active.update(db_tx).await?;
        self.touch_project(db_tx, project).await?;
        Task::try_from(model)
    }

    pub async fn delete_task(&self, user_id: &str, project_id: i32, task_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| self
            .delete_task_in(&db_tx, user_id, project_id, task_id)
            .await)
    }

    async fn delete_task_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        project_id: i32,
        task_id: i32,
    ) -> ResultEngine<()> {
        let project = require_owned::<projects::Entity, _>(db_tx, project_id, user_id).await?;
        let model = find_task(db_tx, project.id, task_id).await?;
        tasks::Entity::delete_by_id(model.id).exec(db_tx).await?;
        self.touch_project(db_tx, project).await?;
        tracing::debug!(user_id, project_id, task_id, "deleted task");
        Ok(())
    }
}

async fn find_task<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    task_id: i32,
) -> ResultEngine<tasks::Model> {
    tasks::Entity::find_by_id(task_id)
        .filter(tasks::Column::ProjectId.eq(project_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("task not exists".to_string()))
}
