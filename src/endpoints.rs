//! The endpoint paths of the JSON API, collected in one place so the router
//! and the tests cannot drift apart.

use std::fmt::Display;

/// The endpoint for logging in.
pub const LOG_IN_API: &str = "/api/log_in";

/// The endpoint for registering a user.
pub const USERS_API: &str = "/api/users";

/// The endpoint for fetching the authenticated user.
pub const ME_API: &str = "/api/users/me";

/// The endpoint for creating and listing transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";

/// The endpoint for a single transaction.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";

/// The endpoint for the authenticated user's transaction count for the
/// current month.
pub const CURRENT_MONTH_COUNT_API: &str = "/api/transactions/current_month/count";

/// The endpoint for creating and listing categories.
pub const CATEGORIES_API: &str = "/api/categories";

/// The endpoint for a single category.
pub const CATEGORY_API: &str = "/api/categories/{category_id}";

/// The endpoint for the authenticated user's daily summaries for a month of
/// the current year.
pub const MONTHLY_SUMMARY_API: &str = "/api/summary/monthly/{month}";

/// Fill in the path parameter of `endpoint` with `value`.
///
/// Endpoints without a path parameter are returned unchanged.
pub fn format_endpoint(endpoint: &str, value: impl Display) -> String {
    let (Some(start), Some(end)) = (endpoint.find('{'), endpoint.find('}')) else {
        return endpoint.to_string();
    };

    format!("{}{}{}", &endpoint[..start], value, &endpoint[end + 1..])
}
