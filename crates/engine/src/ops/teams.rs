use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    EngineError, ResultEngine, Team,
    owned::{owned_by, require_owned},
    team_members, teams,
};

use super::{Engine, users::require_users, with_tx};

impl Engine {
    pub async fn list_teams(&self, user_id: &str) -> ResultEngine<Vec<Team>> {
        let models = owned_by::<teams::Entity>(user_id)
            .order_by_asc(teams::Column::Id)
            .all(&self.database)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = models.iter().map(|team| team.id).collect();
        let mut members: HashMap<i32, Vec<String>> = HashMap::new();
        for member in team_members::Entity::find()
            .filter(team_members::Column::TeamId.is_in(ids))
            .order_by_asc(team_members::Column::UserId)
            .all(&self.database)
            .await?
        {
            members.entry(member.team_id).or_default().push(member.user_id);
        }
        Ok(models
            .into_iter()
            .map(|team| Team {
                members: members.remove(&team.id).unwrap_or_default(),
                id: team.id,
                user_id: team.user_id,
            })
            .collect())
    }

    pub async fn team(&self, user_id: &str, team_id: i32) -> ResultEngine<Team> {
        let model = require_owned::<teams::Entity, _>(&self.database, team_id, user_id).await?;
        load_team(&self.database, model).await
    }

    pub async fn create_team(&self, user_id: &str, members: &[String]) -> ResultEngine<Team> {
        let members = collapse_members(members);
        with_tx!(self, |db_tx| self
            .create_team_in(&db_tx, user_id, &members)
            .await)
    }

    async fn create_team_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        members: &[String],
    ) -> ResultEngine<Team> {
        require_users(db_tx, "members", members).await?;
        let model = teams::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            ..Default::default()
        }
        .insert(db_tx)
        .await?;
        insert_members(db_tx, model.id, members).await?;
        tracing::debug!(user_id, team_id = model.id, "created team");
        load_team(db_tx, model).await
    }

    /// Replaces the member list of a team.
    pub async fn update_team(
        &self,
        user_id: &str,
        team_id: i32,
        members: &[String],
    ) -> ResultEngine<Team> {
        let members = collapse_members(members);
        with_tx!(self, |db_tx| self
            .update_team_in(&db_tx, user_id, team_id, &members)
            .await)
    }

    async fn update_team_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        team_id: i32,
        members: &[String],
    ) -> ResultEngine<Team> {
        let model = require_owned::<teams::Entity, _>(db_tx, team_id, user_id).await?;
        require_users(db_tx, "members", members).await?;
        team_members::Entity::delete_many()
            .filter(team_members::Column::TeamId.eq(model.id))
            .exec(db_tx)
            .await?;
        insert_members(db_tx, model.id, members).await?;
        load_team(db_tx, model).await
    }

    pub async fn delete_team(&self, user_id: &str, team_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_owned::<teams::Entity, _>(&db_tx, team_id, user_id).await?;
            team_members::Entity::delete_many()
                .filter(team_members::Column::TeamId.eq(model.id))
                .exec(&db_tx)
                .await?;
            teams::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            tracing::debug!(user_id, team_id, "deleted team");
            Ok::<_, EngineError>(())
        })
    }
}

/// Trimmed, deduplicated and sorted member names.
fn collapse_members(members: &[String]) -> Vec<String> {
    members
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn insert_members<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
    members: &[String],
) -> ResultEngine<()> {
    if members.is_empty() {
        return Ok(());
    }
    team_members::Entity::insert_many(members.iter().map(|user_id| team_members::ActiveModel {
        team_id: ActiveValue::Set(team_id),
        user_id: ActiveValue::Set(user_id.clone()),
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

async fn load_team<C: ConnectionTrait>(db: &C, model: teams::Model) -> ResultEngine<Team> {
    let members = team_members::Entity::find()
        .filter(team_members::Column::TeamId.eq(model.id))
        .order_by_asc(team_members::Column::UserId)
        .all(db)
        .await?
        .into_iter()
        .map(|member| member.user_id)
        .collect();
    Ok(Team {
        id: model.id,
        user_id: model.user_id,
        members,
    })
}
