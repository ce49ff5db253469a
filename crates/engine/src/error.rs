//! The module contains the error the engine can throw.
//!
//! The errors fall in four classes:
//!
//! - validation: [`InvalidAmount`], [`InvalidName`], [`InvalidCategory`],
//!   [`InvalidOwner`], [`InvalidField`]
//! - lookup: [`KeyNotFound`] thrown when an item is missing or not owned by
//!   the caller
//! - conflict: [`ExistingKey`], [`BalanceConflict`]
//! - storage: [`Database`]
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidCategory`]: EngineError::InvalidCategory
//!  [`InvalidOwner`]: EngineError::InvalidOwner
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`BalanceConflict`]: EngineError::BalanceConflict
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),
    #[error("Invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Balance changed concurrently: {0}")]
    BalanceConflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidName(_)
                | Self::InvalidCategory(_)
                | Self::InvalidOwner(_)
                | Self::InvalidField { .. }
        )
    }

    /// The request field a validation error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidAmount(_) => Some("amount"),
            Self::InvalidName(_) => Some("name"),
            Self::InvalidCategory(_) => Some("category"),
            Self::InvalidOwner(_) => Some("user"),
            Self::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidOwner(a), Self::InvalidOwner(b)) => a == b,
            (
                Self::InvalidField {
                    field: fa,
                    message: ma,
                },
                Self::InvalidField {
                    field: fb,
                    message: mb,
                },
            ) => fa == fb && ma == mb,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::BalanceConflict(a), Self::BalanceConflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
