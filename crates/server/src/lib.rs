use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{AuthUser, ServerState, router, run_with_listener};

mod balances;
mod categories;
mod extract;
mod projects;
mod server;
mod tasks;
mod teams;
mod transactions;

pub mod types {
    pub mod balance {
        pub use api_types::balance::Balance;
    }

    pub mod transaction {
        pub use api_types::transaction::{
            Transaction, TransactionListQuery, TransactionNew, TransactionType, TransactionUpdate,
        };
    }

    pub mod category {
        pub use api_types::category::{Category, CategoryNew};
    }

    pub mod project {
        pub use api_types::project::{Project, ProjectListQuery, ProjectNew, ProjectUpdate};
    }

    pub mod task {
        pub use api_types::task::{Task, TaskNew, TaskStatus, TaskUpdate};
    }

    pub mod team {
        pub use api_types::team::{Team, TeamMembers};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::BalanceConflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidCategory(_)
        | EngineError::InvalidOwner(_)
        | EngineError::InvalidField { .. } => StatusCode::BAD_REQUEST,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    let field = err.field().map(ToString::to_string);
    let error = match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    ErrorBody { error, field }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error, field: None },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
