use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, users};

use super::Engine;

impl Engine {
    /// Registers a user with a bcrypt-hashed password.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidField {
                field: "username",
                message: "username must not be empty".to_string(),
            });
        }
        if password.is_empty() {
            return Err(EngineError::InvalidField {
                field: "password",
                message: "password must not be empty".to_string(),
            });
        }
        if users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(username.to_string()));
        }

        let password_hash =
            bcrypt::hash(password, self.password_cost).map_err(|err| EngineError::InvalidField {
                field: "password",
                message: err.to_string(),
            })?;
        users::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            password_hash: ActiveValue::Set(password_hash),
        }
        .insert(&self.database)
        .await?;
        tracing::info!(username, "created user");
        Ok(())
    }

    pub async fn user_exists(&self, username: &str) -> ResultEngine<bool> {
        Ok(users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .is_some())
    }

    /// Checks a username/password pair. Returns the username on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<String>> {
        let Some(user) = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };
        match bcrypt::verify(password, &user.password_hash) {
            Ok(true) => Ok(Some(user.username)),
            Ok(false) => Ok(None),
            Err(err) => {
                tracing::warn!(username, "unreadable password hash: {err}");
                Ok(None)
            }
        }
    }
}

/// Fails with `InvalidField { field }` unless every username exists.
pub(super) async fn require_users<C: ConnectionTrait>(
    db: &C,
    field: &'static str,
    usernames: &[String],
) -> ResultEngine<()> {
    if usernames.is_empty() {
        return Ok(());
    }
    let found = users::Entity::find()
        .filter(users::Column::Username.is_in(usernames.iter().cloned()))
        .all(db)
        .await?;
    if let Some(missing) = usernames
        .iter()
        .find(|name| !found.iter().any(|user| &user.username == *name))
    {
        return Err(EngineError::InvalidField {
            field,
            message: format!("user {missing} not exists"),
        });
    }
    Ok(())
}
