//! Personal finance and project tracking engine.
//!
//! The engine owns the storage model (sea-orm entities) and every write
//! path. Its central job is keeping each user's [`Balance`] equal to the
//! signed sum of that user's [`Transaction`]s across create, update and
//! delete, without replaying history: a write first reverses the stored
//! effect of the transaction (normalization) and then applies the new one,
//! all inside a single database transaction.

pub use balances::Balance;
pub use categories::Category;
pub use commands::{
    NewProjectCmd, NewTaskCmd, NewTransactionCmd, UpdateProjectCmd, UpdateTaskCmd,
    UpdateTransactionCmd,
};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, MAX_BALANCE_ATTEMPTS, TransactionListFilter};
pub use projects::Project;
pub use tasks::{Task, TaskStatus};
pub use teams::Team;
pub use transactions::{Transaction, TransactionType};

mod balances;
mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod owned;
mod projects;
mod tasks;
mod team_members;
mod teams;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
