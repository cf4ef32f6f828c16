//! Route handlers for the transaction CRUD endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::Claims,
    models::{DatabaseID, Transaction, TransactionBuilder, TransactionKind},
    pagination::PaginationParams,
    state::AppState,
};

/// The data a client sends to create or overwrite a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionData {
    /// How much money changed hands. Must not be negative.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The ID of the category the transaction belongs to. Must refer to a
    /// category owned by the authenticated user.
    pub category_id: DatabaseID,
    /// When the transaction happened. Defaults to today, must not be in the
    /// future.
    pub date: Option<Date>,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub description: String,
}

impl TransactionData {
    fn into_builder(self, claims: &Claims) -> Result<TransactionBuilder, Error> {
        let mut builder = Transaction::build(self.amount, self.kind, self.category_id, claims.user_id())
            .description(&self.description);

        if let Some(date) = self.date {
            builder = builder.date(date)?;
        }

        Ok(builder)
    }
}

/// One page of a user's transactions.
#[derive(Debug, Serialize)]
pub struct TransactionPage {
    /// The transactions on this page, most recent first.
    pub transactions: Vec<Transaction>,
    /// Which page this is, starting at one.
    pub page: u64,
    /// The page size that was used.
    pub per_page: u64,
    /// How many transactions the user has in total.
    pub total: u64,
}

/// Handler for creating a transaction owned by the authenticated user.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::FutureDate] if the date is in the future,
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user.
pub async fn create_transaction(
    State(state): State<AppState>,
    claims: Claims,
    Json(data): Json<TransactionData>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let builder = data.into_builder(&claims)?;

    let connection = state.db_connection().lock().unwrap();
    let transaction = builder.insert(&connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Handler for listing the authenticated user's transactions one page at a
/// time.
pub async fn get_transactions(
    State(state): State<AppState>,
    claims: Claims,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<TransactionPage>, Error> {
    let connection = state.db_connection().lock().unwrap();

    let transactions = Transaction::select_page_by_user(
        claims.user_id(),
        pagination.limit(),
        pagination.offset(),
        &connection,
    )?;
    let total = Transaction::count_by_user(claims.user_id(), &connection)?;

    Ok(Json(TransactionPage {
        transactions,
        page: pagination.page,
        per_page: pagination.limit(),
        total,
    }))
}

/// Handler for fetching one of the authenticated user's transactions.
///
/// # Errors
/// This function will return an [Error::NotFound] if the transaction does
/// not exist or belongs to another user. The two cases are indistinguishable
/// to the client on purpose.
pub async fn get_transaction(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection().lock().unwrap();
    let transaction = Transaction::select(transaction_id, &connection)?;

    if transaction.user_id() != claims.user_id() {
        return Err(Error::NotFound);
    }

    Ok(Json(transaction))
}

/// Handler for overwriting one of the authenticated user's transactions.
///
/// # Errors
/// This function will return an [Error::NotFound] if the transaction does
/// not exist or belongs to another user, and the same validation errors as
/// [create_transaction].
pub async fn update_transaction(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(data): Json<TransactionData>,
) -> Result<Json<Transaction>, Error> {
    let builder = data.into_builder(&claims)?;

    let connection = state.db_connection().lock().unwrap();
    let transaction = Transaction::update(transaction_id, builder, &connection)?;

    Ok(Json(transaction))
}

/// Handler for deleting one of the authenticated user's transactions.
///
/// # Errors
/// This function will return an [Error::NotFound] if the transaction does
/// not exist or belongs to another user.
pub async fn delete_transaction(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection().lock().unwrap();
    Transaction::delete(transaction_id, claims.user_id(), &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
