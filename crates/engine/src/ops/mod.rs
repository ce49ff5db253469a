use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod balances;
mod categories;
mod projects;
mod tasks;
mod teams;
mod transactions;
mod users;

pub use transactions::TransactionListFilter;

/// How many times a balance write is attempted before a concurrent
/// modification is reported to the caller.
pub const MAX_BALANCE_ATTEMPTS: u32 = 3;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Like `with_tx!`, but a `BalanceConflict` rolls back and reruns the whole
/// block, up to [`MAX_BALANCE_ATTEMPTS`] times.
macro_rules! with_balance_retry {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let mut attempt = 1;
        loop {
            let result = $crate::ops::with_tx!($self, |$tx| $body);
            match result {
                Err($crate::EngineError::BalanceConflict(reason))
                    if attempt < $crate::ops::MAX_BALANCE_ATTEMPTS =>
                {
                    tracing::warn!(attempt, %reason, "balance changed concurrently, retrying");
                    attempt += 1;
                }
                other => break other,
            }
        }
    }};
}

pub(crate) use with_balance_retry;
pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    password_cost: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    password_cost: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// bcrypt cost used when hashing new passwords.
    pub fn password_cost(mut self, cost: u32) -> EngineBuilder {
        self.password_cost = cost;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            password_cost: self.password_cost,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::Engine;

    pub(crate) async fn engine_with_users(users: &[&str]) -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .database(db)
            .password_cost(4)
            .build()
            .await
            .unwrap();
        for user in users {
            engine.create_user(user, "password").await.unwrap();
        }
        engine
    }
}
