//! Transaction primitives.
//!
//! A `Transaction` is an income (`IN`) or an expense (`OUT`) recorded by a
//! user. Its signed amount is reflected exactly once in the owner's
//! [`Balance`](crate::Balance).

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, owned::OwnedEntity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    In,
    Out,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    /// The effect of `amount` on a balance: positive for `IN`, negative for
    /// `OUT`.
    pub fn signed(self, amount: MoneyCents) -> MoneyCents {
        match self {
            Self::In => amount,
            Self::Out => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            other => Err(EngineError::InvalidField {
                field: "transaction_type",
                message: format!("invalid transaction type: {other}"),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub user_id: String,
    pub transaction_type: TransactionType,
    pub amount: MoneyCents,
    pub created_at: NaiveDate,
    pub updated_at: DateTime<Utc>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
}

impl Transaction {
    /// Signed contribution of this transaction to its owner's balance.
    pub fn signed_amount(&self) -> MoneyCents {
        self.transaction_type.signed(self.amount)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub transaction_type: String,
    pub amount_minor: i64,
    pub created_at: Date,
    pub updated_at: DateTimeUtc,
    pub description: Option<String>,
    pub category_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl OwnedEntity for Entity {
    const LABEL: &'static str = "transaction";

    fn owner_column() -> Self::Column {
        Column::UserId
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            transaction_type: TransactionType::try_from(model.transaction_type.as_str())?,
            amount: MoneyCents::new(model.amount_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
            description: model.description,
            category_id: model.category_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_round_trips_through_storage_text() {
        assert_eq!(TransactionType::try_from("IN").unwrap(), TransactionType::In);
        assert_eq!(TransactionType::try_from("OUT").unwrap(), TransactionType::Out);
        assert_eq!(TransactionType::In.as_str(), "IN");
        assert!(TransactionType::try_from("in").is_err());
    }

    #[test]
    fn signed_follows_direction() {
        let amount = MoneyCents::new(5000);
        assert_eq!(TransactionType::In.signed(amount), MoneyCents::new(5000));
        assert_eq!(TransactionType::Out.signed(amount), MoneyCents::new(-5000));
    }
}
