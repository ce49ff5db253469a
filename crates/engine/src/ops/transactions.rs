use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, NewTransactionCmd, ResultEngine, Transaction, UpdateTransactionCmd,
    owned::{owned_by, require_owned},
    transactions,
    util::{ensure_transaction_amount, month_range, normalize_optional_text},
};

use super::{Engine, balances::normalize_balance, with_balance_retry};

/// Filters for listing transactions.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    /// Any day (`YYYY-MM-DD`) of the month to list. An empty value means no
    /// filter; an unparseable one matches nothing.
    pub created_at: Option<String>,
}

impl TransactionListFilter {
    #[must_use]
    pub fn month_of(created_at: impl Into<String>) -> Self {
        Self {
            created_at: Some(created_at.into()),
        }
    }
}

impl Engine {
    /// Records a transaction and applies it to the owner's balance.
    ///
    /// The balance is created on first use. Row insert and balance update
    /// commit together or not at all.
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Transaction> {
        ensure_transaction_amount(cmd.amount)?;
        with_balance_retry!(self, |db_tx| self
            .create_transaction_in(&db_tx, &cmd)
            .await)
    }

    async fn create_transaction_in(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &NewTransactionCmd,
    ) -> ResultEngine<Transaction> {
        let category_id = self
            .resolve_category(db_tx, &cmd.user_id, cmd.category_id)
            .await?;

        let mut balance = self.balance_for_user(db_tx, &cmd.user_id).await?;
        balance.apply(cmd.transaction_type, cmd.amount)?;
        self.persist_balance(db_tx, &mut balance).await?;

        let now = Utc::now();
        let model = transactions::ActiveModel {
            user_id: ActiveValue::Set(cmd.user_id.clone()),
            transaction_type: ActiveValue::Set(cmd.transaction_type.as_str().to_string()),
            amount_minor: ActiveValue::Set(cmd.amount.cents()),
            created_at: ActiveValue::Set(cmd.created_at.unwrap_or_else(|| now.date_naive())),
            updated_at: ActiveValue::Set(now),
            description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
            category_id: ActiveValue::Set(category_id),
            ..Default::default()
        }
        .insert(db_tx)
        .await?;

        tracing::debug!(
            user_id = %cmd.user_id,
            transaction_id = model.id,
            balance = %balance.amount,
            "created transaction"
        );
        Transaction::try_from(model)
    }

    /// Rewrites a transaction: its stored effect is reverted from the
    /// balance before the new one is applied.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        if let Some(amount) = cmd.amount {
            ensure_transaction_amount(amount)?;
        }
        with_balance_retry!(self, |db_tx| self
            .update_transaction_in(&db_tx, &cmd)
            .await)
    }

    async fn update_transaction_in(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        let user_id = cmd.user_id.as_str();
        let stored = Transaction::try_from(
            require_owned::<transactions::Entity, _>(db_tx, cmd.transaction_id, user_id).await?,
        )?;

        let transaction_type = cmd.transaction_type.unwrap_or(stored.transaction_type);
        let amount = cmd.amount.unwrap_or(stored.amount);
        let category_id = match cmd.category_id {
            Some(category_id) => self.resolve_category(db_tx, user_id, category_id).await?,
            None => stored.category_id,
        };
        let description = match &cmd.description {
            Some(description) => normalize_optional_text(description.as_deref()),
            None => stored.description.clone(),
        };

        let mut balance = self.balance_for_user(db_tx, user_id).await?;
        normalize_balance(db_tx, &mut balance, stored.id, user_id).await?;
        balance.apply(transaction_type, amount)?;
        self.persist_balance(db_tx, &mut balance).await?;

        let model = transactions::ActiveModel {
            id: ActiveValue::Unchanged(stored.id),
            transaction_type: ActiveValue::Set(transaction_type.as_str().to_string()),
            amount_minor: ActiveValue::Set(amount.cents()),
            created_at: ActiveValue::Set(cmd.created_at.unwrap_or(stored.created_at)),
            updated_at: ActiveValue::Set(Utc::now()),
            description: ActiveValue::Set(description),
            category_id: ActiveValue::Set(category_id),
            ..Default::default()
        }
        .update(db_tx)
        .await?;

        tracing::debug!(
            user_id,
            transaction_id = model.id,
            balance = %balance.amount,
            "updated transaction"
        );
        Transaction::try_from(model)
    }

    /// Deletes a transaction after reverting its effect from the balance.
    pub async fn delete_transaction(&self, user_id: &str, transaction_id: i32) -> ResultEngine<()> {
        with_balance_retry!(self, |db_tx| self
            .delete_transaction_in(&db_tx, user_id, transaction_id)
            .await)
    }

    async fn delete_transaction_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transaction_id: i32,
    ) -> ResultEngine<()> {
        let stored =
            require_owned::<transactions::Entity, _>(db_tx, transaction_id, user_id).await?;

        let mut balance = self.require_balance(db_tx, user_id).await?;
        normalize_balance(db_tx, &mut balance, stored.id, user_id).await?;
        self.persist_balance(db_tx, &mut balance).await?;

        transactions::Entity::delete_by_id(stored.id)
            .exec(db_tx)
            .await?;
        tracing::debug!(
            user_id,
            transaction_id,
            balance = %balance.amount,
            "deleted transaction"
        );
        Ok(())
    }

    pub async fn transaction(&self, user_id: &str, transaction_id: i32) -> ResultEngine<Transaction> {
        let model =
            require_owned::<transactions::Entity, _>(&self.database, transaction_id, user_id)
                .await?;
        Transaction::try_from(model)
    }

    /// Transactions of `user_id`, newest first.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = owned_by::<transactions::Entity>(user_id);
        if let Some(raw) = filter.created_at.as_deref().filter(|raw| !raw.is_empty()) {
            let Some((first, last)) = month_range(raw) else {
                tracing::debug!(created_at = raw, "unparseable month filter");
                return Ok(Vec::new());
            };
            query = query.filter(transactions::Column::CreatedAt.between(first, last));
        }

        query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>, EngineError>>()
    }
}
