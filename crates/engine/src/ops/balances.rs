use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, SqlErr, prelude::*, sea_query::Expr};

use crate::{
    Balance, EngineError, MoneyCents, ResultEngine, Transaction, balances, owned::owned_by,
    transactions,
};

use super::{Engine, with_balance_retry};

impl Engine {
    /// Current balance of `user_id`, created at zero on first access.
    pub async fn balance(&self, user_id: &str) -> ResultEngine<Balance> {
        with_balance_retry!(self, |db_tx| self.balance_for_user(&db_tx, user_id).await)
    }

    /// Rebuilds the stored balance from the user's transactions.
    ///
    /// The write paths never need this; it exists to audit or repair a
    /// balance row after out-of-band changes to the `transactions` table.
    pub async fn recompute_balance(&self, user_id: &str) -> ResultEngine<Balance> {
        with_balance_retry!(self, |db_tx| self.recompute_balance_in(&db_tx, user_id).await)
    }

    async fn recompute_balance_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Balance> {
        let mut balance = self.balance_for_user(db_tx, user_id).await?;
        let mut total = MoneyCents::ZERO;
        for model in owned_by::<transactions::Entity>(user_id).all(db_tx).await? {
            total = total
                .checked_add(Transaction::try_from(model)?.signed_amount())
                .ok_or_else(|| {
                    EngineError::InvalidAmount(format!("ledger of {user_id} out of range"))
                })?;
        }
        if total != balance.amount {
            tracing::warn!(
                user_id,
                stored = %balance.amount,
                computed = %total,
                "balance drifted from transactions, rewriting"
            );
            balance.amount = total;
            self.persist_balance(db_tx, &mut balance).await?;
        }
        Ok(balance)
    }

    /// Loads the balance row of `user_id`, inserting a zero row when missing.
    ///
    /// Two writers racing on the first insert hit the unique `user_id`
    /// index; the loser gets `BalanceConflict` and is retried.
    pub(super) async fn balance_for_user(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Balance> {
        if let Some(model) = balances::Entity::find()
            .filter(balances::Column::UserId.eq(user_id))
            .one(db_tx)
            .await?
        {
            return Ok(model.into());
        }

        let active = balances::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            amount_minor: ActiveValue::Set(0),
            version: ActiveValue::Set(0),
            ..Default::default()
        };
        match active.insert(db_tx).await {
            Ok(model) => {
                tracing::debug!(user_id, "created balance");
                Ok(model.into())
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(EngineError::BalanceConflict(format!(
                    "balance of {user_id} created concurrently"
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the balance row of `user_id` without creating it.
    pub(super) async fn require_balance(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Balance> {
        balances::Entity::find()
            .filter(balances::Column::UserId.eq(user_id))
            .one(db_tx)
            .await?
            .map(Balance::from)
            .ok_or_else(|| EngineError::KeyNotFound("balance not exists".to_string()))
    }

    /// Writes `balance.amount` back, provided nobody persisted the row since
    /// it was read. On success `balance.version` is advanced.
    pub(super) async fn persist_balance(
        &self,
        db_tx: &DatabaseTransaction,
        balance: &mut Balance,
    ) -> ResultEngine<()> {
        let next_version = balance.version + 1;
        let result = balances::Entity::update_many()
            .col_expr(
                balances::Column::AmountMinor,
                Expr::value(balance.amount.cents()),
            )
            .col_expr(balances::Column::Version, Expr::value(next_version))
            .filter(balances::Column::Id.eq(balance.id))
            .filter(balances::Column::Version.eq(balance.version))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::BalanceConflict(format!(
                "balance of {} changed since version {}",
                balance.user_id, balance.version
            )));
        }
        balance.version = next_version;
        Ok(())
    }
}

/// Removes the stored effect of transaction `transaction_id` from `balance`.
///
/// Reads the transaction as it is currently persisted, so it must run
/// before the row is rewritten or deleted. Fails when the row does not
/// exist or belongs to somebody other than `expected_owner`; the balance is
/// left untouched in both cases.
pub(super) async fn normalize_balance(
    db_tx: &DatabaseTransaction,
    balance: &mut Balance,
    transaction_id: i32,
    expected_owner: &str,
) -> ResultEngine<()> {
    let model = transactions::Entity::find_by_id(transaction_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
    if model.user_id != expected_owner || balance.user_id != expected_owner {
        return Err(EngineError::InvalidOwner(format!(
            "transaction {transaction_id} is not owned by {expected_owner}"
        )));
    }
    let stored = Transaction::try_from(model)?;
    balance.revert(stored.transaction_type, stored.amount)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use sea_orm::TransactionTrait;

    use super::*;
    use crate::{
        NewTransactionCmd, TransactionType,
        ops::{MAX_BALANCE_ATTEMPTS, test_support::engine_with_users},
    };

    /// Adds 10.00 to alice's balance. During the first `interfering` attempts
    /// another writer bumps the row version after it was read.
    async fn deposit_with_interference(
        engine: &Engine,
        attempts: &AtomicU32,
        interfering: u32,
    ) -> ResultEngine<Balance> {
        with_balance_retry!(engine, |db_tx| interfered_deposit(
            engine,
            &db_tx,
            attempts,
            interfering
        )
        .await)
    }

    async fn interfered_deposit(
        engine: &Engine,
        db_tx: &DatabaseTransaction,
        attempts: &AtomicU32,
        interfering: u32,
    ) -> ResultEngine<Balance> {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let mut balance = engine.balance_for_user(db_tx, "alice").await?;
        if attempt <= interfering {
            balances::Entity::update_many()
                .col_expr(balances::Column::Version, Expr::value(balance.version + 1))
                .filter(balances::Column::Id.eq(balance.id))
                .exec(db_tx)
                .await?;
        }
        balance.apply(TransactionType::In, MoneyCents::new(1_000))?;
        engine.persist_balance(db_tx, &mut balance).await?;
        Ok(balance)
    }

    #[tokio::test]
    async fn conflicting_write_is_retried_until_it_lands() {
        let engine = engine_with_users(&["alice"]).await;
        engine.balance("alice").await.unwrap();

        let attempts = AtomicU32::new(0);
        let balance =
            deposit_with_interference(&engine, &attempts, MAX_BALANCE_ATTEMPTS - 1)
                .await
                .unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_BALANCE_ATTEMPTS);
        assert_eq!(balance.amount, MoneyCents::new(1_000));

        let stored = engine.balance("alice").await.unwrap();
        assert_eq!(stored.amount, MoneyCents::new(1_000));
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn conflict_is_reported_after_last_attempt() {
        let engine = engine_with_users(&["alice"]).await;
        engine.balance("alice").await.unwrap();

        let attempts = AtomicU32::new(0);
        let err = deposit_with_interference(&engine, &attempts, MAX_BALANCE_ATTEMPTS)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::BalanceConflict(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_BALANCE_ATTEMPTS);

        let stored = engine.balance("alice").await.unwrap();
        assert_eq!(stored.amount, MoneyCents::ZERO);
        assert_eq!(stored.version, 0);
    }

    #[tokio::test]
    async fn stale_snapshot_cannot_overwrite_newer_balance() {
        let engine = engine_with_users(&["alice"]).await;
        engine.balance("alice").await.unwrap();

        let db_tx = engine.database.begin().await.unwrap();
        let mut first = engine.balance_for_user(&db_tx, "alice").await.unwrap();
        // Both writers read the same version before either persisted.
        let mut second = first.clone();

        first.apply(TransactionType::In, MoneyCents::new(10_000)).unwrap();
        engine.persist_balance(&db_tx, &mut first).await.unwrap();
        assert_eq!(first.version, 1);

        second.apply(TransactionType::In, MoneyCents::new(5_000)).unwrap();
        let err = engine.persist_balance(&db_tx, &mut second).await.unwrap_err();
        assert!(matches!(err, EngineError::BalanceConflict(_)));
        db_tx.commit().await.unwrap();

        let balance = engine.balance("alice").await.unwrap();
        assert_eq!(balance.amount, MoneyCents::new(10_000));
        assert_eq!(balance.version, 1);
    }

    #[tokio::test]
    async fn normalize_reverts_stored_effect() {
        let engine = engine_with_users(&["alice"]).await;
        let tx = engine
            .create_transaction(NewTransactionCmd::new(
                "alice",
                TransactionType::In,
                MoneyCents::new(5_000),
            ))
            .await
            .unwrap();

        let db_tx = engine.database.begin().await.unwrap();
        let mut balance = engine.balance_for_user(&db_tx, "alice").await.unwrap();
        assert_eq!(balance.amount, MoneyCents::new(5_000));
        normalize_balance(&db_tx, &mut balance, tx.id, "alice")
            .await
            .unwrap();
        assert_eq!(balance.amount, MoneyCents::ZERO);
    }

    #[tokio::test]
    async fn normalize_rejects_foreign_transaction() {
        let engine = engine_with_users(&["alice", "bob"]).await;
        let tx = engine
            .create_transaction(NewTransactionCmd::new(
                "alice",
                TransactionType::Out,
                MoneyCents::new(2_500),
            ))
            .await
            .unwrap();
        engine.balance("bob").await.unwrap();

        let db_tx = engine.database.begin().await.unwrap();
        let mut bob = engine.balance_for_user(&db_tx, "bob").await.unwrap();
        let err = normalize_balance(&db_tx, &mut bob, tx.id, "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidOwner(_)));
        assert_eq!(bob.amount, MoneyCents::ZERO);

        let err = normalize_balance(&db_tx, &mut bob, tx.id + 100, "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }

    #[tokio::test]
    async fn recompute_repairs_drifted_balance() {
        let engine = engine_with_users(&["alice"]).await;
        for (kind, cents) in [
            (TransactionType::In, 10_000),
            (TransactionType::Out, 2_550),
        ] {
            engine
                .create_transaction(NewTransactionCmd::new("alice", kind, MoneyCents::new(cents)))
                .await
                .unwrap();
        }

        balances::Entity::update_many()
            .col_expr(balances::Column::AmountMinor, Expr::value(1_i64))
            .filter(balances::Column::UserId.eq("alice"))
            .exec(&engine.database)
            .await
            .unwrap();

        let balance = engine.recompute_balance("alice").await.unwrap();
        assert_eq!(balance.amount, MoneyCents::new(7_450));
        assert_eq!(engine.balance("alice").await.unwrap().amount, MoneyCents::new(7_450));
    }
}
