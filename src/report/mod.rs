//! Reports derived from a user's ledger.
//!
//! The centerpiece is the monthly report: per-day income, expense and
//! transaction count summaries that back the dashboard's bar chart.

mod aggregation;
mod handlers;

pub use aggregation::{
    DailySummary, daily_summaries, month_abbreviation, month_bounds, monthly_summary,
    parse_month_abbreviation,
};
pub use handlers::{TransactionCountResponse, get_current_month_count, get_monthly_summary};
