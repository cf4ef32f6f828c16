//! Route handlers for the reporting endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::Claims,
    models::Transaction,
    report::aggregation::{DailySummary, month_bounds, monthly_summary, parse_month_abbreviation},
    state::AppState,
};

/// The authenticated user's transaction count for the current month.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionCountResponse {
    /// How many transactions the user created this month, income and expense
    /// combined.
    pub count: u64,
}

/// Handler for the daily summaries of one month of the current year.
///
/// `month` is a 3-letter month name such as "Mar". A month name that does
/// not parse yields an empty list rather than an error, matching the
/// behaviour for months without transactions.
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    claims: Claims,
    Path(month_name): Path<String>,
) -> Result<Json<Vec<DailySummary>>, Error> {
    let Some(month) = parse_month_abbreviation(&month_name) else {
        tracing::debug!("unrecognized month name {month_name:?}, returning an empty summary");
        return Ok(Json(Vec::new()));
    };

    let year = OffsetDateTime::now_utc().year();

    let connection = state.db_connection().lock().unwrap();
    let summaries = monthly_summary(claims.user_id(), month, year, &connection)?;

    Ok(Json(summaries))
}

/// Handler for the authenticated user's transaction count for the current
/// month.
pub async fn get_current_month_count(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<TransactionCountResponse>, Error> {
    let today = OffsetDateTime::now_utc().date();
    let bounds = month_bounds(today.year(), today.month())?;

    let connection = state.db_connection().lock().unwrap();
    let count = Transaction::count_in_range(claims.user_id(), bounds, &connection)?;

    Ok(Json(TransactionCountResponse { count }))
}
