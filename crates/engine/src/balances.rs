//! Per-user running balance.
//!
//! The stored `amount_minor` is a denormalized total: it always equals the
//! signed sum of the owner's transactions. Only the transaction write path
//! mutates it, and every persist is a compare-and-swap on `version`.

use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::{EngineError, MoneyCents, ResultEngine, TransactionType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub id: i32,
    pub user_id: String,
    pub amount: MoneyCents,
    /// Row version read together with `amount`; bumped on every persist.
    pub version: i64,
}

impl Balance {
    /// Applies the effect of a transaction: `IN` adds, `OUT` subtracts.
    ///
    /// On overflow the balance is left unchanged.
    pub fn apply(
        &mut self,
        transaction_type: TransactionType,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        self.amount = self
            .amount
            .checked_add(transaction_type.signed(amount))
            .ok_or_else(|| self.out_of_range())?;
        Ok(())
    }

    /// Reverses a previously applied effect.
    pub fn revert(
        &mut self,
        transaction_type: TransactionType,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        self.amount = self
            .amount
            .checked_sub(transaction_type.signed(amount))
            .ok_or_else(|| self.out_of_range())?;
        Ok(())
    }

    fn out_of_range(&self) -> EngineError {
        EngineError::InvalidAmount(format!("balance of {} out of range", self.user_id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "balances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: String,
    pub amount_minor: i64,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Balance {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            amount: MoneyCents::new(model.amount_minor),
            version: model.version,
        }
    }
}
