//! Defines the JSON API's router and, in its tests, exercises the API
//! surface end to end against an in-memory database.

mod category;
mod transaction;
mod user;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{auth, endpoints, report, state::AppState};

pub use category::CategoryData;
pub use transaction::{TransactionData, TransactionPage};
pub use user::{RegisterUserData, UserResponse};

/// Create the router for the JSON API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::LOG_IN_API, post(auth::log_in))
        .route(endpoints::USERS_API, post(user::create_user))
        .route(endpoints::ME_API, get(user::get_me))
        .route(
            endpoints::TRANSACTIONS_API,
            post(transaction::create_transaction).get(transaction::get_transactions),
        )
        .route(
            endpoints::CURRENT_MONTH_COUNT_API,
            get(report::get_current_month_count),
        )
        .route(
            endpoints::TRANSACTION_API,
            get(transaction::get_transaction)
                .put(transaction::update_transaction)
                .delete(transaction::delete_transaction),
        )
        .route(
            endpoints::CATEGORIES_API,
            post(category::create_category).get(category::get_categories),
        )
        .route(
            endpoints::CATEGORY_API,
            get(category::get_category).delete(category::delete_category),
        )
        .route(endpoints::MONTHLY_SUMMARY_API, get(report::get_monthly_summary))
        .with_state(state)
}
