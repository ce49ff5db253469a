//! Owned-resource queries.
//!
//! Every user-scoped table names its owner column once through
//! [`OwnedEntity`]; listing and lookups go through [`owned_by`] and
//! [`require_owned`] so a row owned by somebody else is indistinguishable
//! from a missing one.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PrimaryKeyTrait, QueryFilter, Select};

use crate::{EngineError, ResultEngine};

pub(crate) trait OwnedEntity: EntityTrait {
    /// Human readable name used in not-found errors.
    const LABEL: &'static str;

    fn owner_column() -> Self::Column;
}

/// All rows of `E` owned by `user_id`.
pub(crate) fn owned_by<E: OwnedEntity>(user_id: &str) -> Select<E> {
    E::find().filter(E::owner_column().eq(user_id))
}

/// The row `id` of `E`, provided `user_id` owns it.
pub(crate) async fn require_owned<E, C>(db: &C, id: i32, user_id: &str) -> ResultEngine<E::Model>
where
    E: OwnedEntity,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    E::find_by_id(id)
        .filter(E::owner_column().eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("{} not exists", E::LABEL)))
}
