//! Transactions API endpoints

use api_types::{
    Amount,
    transaction::{
        Transaction, TransactionListQuery, TransactionNew, TransactionType as ApiType,
        TransactionUpdate,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    MoneyCents, NewTransactionCmd, TransactionListFilter, TransactionType, UpdateTransactionCmd,
};

use crate::{AuthUser, ServerError, ServerState, extract::ApiJson};

fn map_type(kind: ApiType) -> TransactionType {
    match kind {
        ApiType::In => TransactionType::In,
        ApiType::Out => TransactionType::Out,
    }
}

fn map_api_type(kind: TransactionType) -> ApiType {
    match kind {
        TransactionType::In => ApiType::In,
        TransactionType::Out => ApiType::Out,
    }
}

fn parse_amount(amount: &Amount) -> Result<MoneyCents, ServerError> {
    Ok(amount.0.parse::<MoneyCents>()?)
}

fn map_transaction(tx: engine::Transaction) -> Transaction {
    Transaction {
        id: tx.id,
        transaction_type: map_api_type(tx.transaction_type),
        amount: Amount(tx.amount.to_string()),
        created_at: tx.created_at,
        updated_at: tx.updated_at,
        description: tx.description,
        category: tx.category_id,
    }
}

pub async fn list(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let filter = TransactionListFilter {
        created_at: query.created_at,
    };
    let transactions = state
        .engine
        .list_transactions(&user, &filter)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();
    Ok(Json(transactions))
}

pub async fn get(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Transaction>, ServerError> {
    let tx = state.engine.transaction(&user, id).await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn create(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> Result<(StatusCode, Json<Transaction>), ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let mut cmd = NewTransactionCmd::new(user, map_type(payload.transaction_type), amount);
    cmd.created_at = payload.created_at;
    cmd.description = payload.description;
    cmd.category_id = payload.category;

    let tx = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}

pub async fn update(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<TransactionUpdate>,
) -> Result<Json<Transaction>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(user, id);
    cmd.transaction_type = payload.transaction_type.map(map_type);
    cmd.amount = payload.amount.as_ref().map(parse_amount).transpose()?;
    cmd.created_at = payload.created_at;
    cmd.description = payload.description;
    cmd.category_id = payload.category;

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn delete(
    Extension(AuthUser(user)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
