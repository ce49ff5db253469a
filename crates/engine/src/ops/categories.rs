use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*, sea_query::Expr,
};

use crate::{
    Category, EngineError, ResultEngine, categories,
    owned::{owned_by, require_owned},
    transactions,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        let models = owned_by::<categories::Entity>(user_id)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn category(&self, user_id: &str, category_id: i32) -> ResultEngine<Category> {
        let model =
            require_owned::<categories::Entity, _>(&self.database, category_id, user_id).await?;
        Ok(model.into())
    }

    pub async fn create_category(&self, user_id: &str, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let model = categories::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            name: ActiveValue::Set(name),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;
        tracing::debug!(user_id, category_id = model.id, "created category");
        Ok(model.into())
    }

    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: i32,
        name: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let model = require_owned::<categories::Entity, _>(&db_tx, category_id, user_id).await?;
            let mut active: categories::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            let model = active.update(&db_tx).await?;
            Ok::<_, EngineError>(Category::from(model))
        })
    }

    /// Deletes a category. Transactions pointing at it become uncategorized.
    pub async fn delete_category(&self, user_id: &str, category_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| self
            .delete_category_in(&db_tx, user_id, category_id)
            .await)
    }

    async fn delete_category_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category_id: i32,
    ) -> ResultEngine<()> {
        let model = require_owned::<categories::Entity, _>(db_tx, category_id, user_id).await?;
        let detached = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::CategoryId,
                Expr::value(Value::Int(None)),
            )
            .filter(transactions::Column::CategoryId.eq(model.id))
            .exec(db_tx)
            .await?;
        categories::Entity::delete_by_id(model.id).exec(db_tx).await?;
        tracing::debug!(
            user_id,
            category_id,
            detached = detached.rows_affected,
            "deleted category"
        );
        Ok(())
    }

    /// Checks that `category_id`, when given, names a category of `user_id`.
    pub(super) async fn resolve_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category_id: Option<i32>,
    ) -> ResultEngine<Option<i32>> {
        let Some(category_id) = category_id else {
            return Ok(None);
        };
        match require_owned::<categories::Entity, _>(db_tx, category_id, user_id).await {
            Ok(model) => Ok(Some(model.id)),
            Err(EngineError::KeyNotFound(_)) => Err(EngineError::InvalidCategory(format!(
                "category {category_id} not exists"
            ))),
            Err(err) => Err(err),
        }
    }
}
