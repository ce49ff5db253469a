//! Balance API endpoint.

use api_types::{Amount, balance::Balance};
use axum::{Extension, Json, extract::State};

use crate::{AuthUser, ServerError, ServerState};

/// Returns the caller's balance, creating it at zero on first access.
pub async fn me(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Balance>, ServerError> {
    let balance = state.engine.balance(&user).await?;
    Ok(Json(Balance {
        id: balance.id,
        amount: Amount(balance.amount.to_string()),
    }))
}
