//! The monthly ledger aggregation.
//!
//! Reduces a user's transactions for one month into per-day summaries of
//! income, expense and transaction count, the data behind the dashboard's
//! bar chart. Months are handled as [time::Month] internally and only
//! formatted to (or parsed from) their 3-letter names at the serialization
//! boundary.

use std::{collections::HashMap, ops::RangeInclusive};

use rusqlite::Connection;
use serde::{Serialize, Serializer};
use time::{Date, Month};

use crate::{
    Error,
    models::{Transaction, TransactionKind, UserID},
};

/// The income, expense and transaction count for a single day of a month.
///
/// Derived on demand from the ledger, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// The day of the month, 1-31.
    pub day: u8,
    /// The month the summary belongs to, serialized as a 3-letter name.
    #[serde(serialize_with = "serialize_month_abbreviation")]
    pub month: Month,
    /// The sum of the amounts of the day's income transactions.
    pub income: f64,
    /// The sum of the amounts of the day's expense transactions.
    pub expense: f64,
    /// The number of transactions that contributed to the day, income and
    /// expense combined.
    pub transaction_count: u64,
}

/// Formats a month as its three-letter abbreviation.
pub fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Parses a three-letter month abbreviation, e.g. "Mar".
///
/// The match is exact and case-sensitive, mirroring the encoding used on the
/// wire. Returns `None` for anything else.
pub fn parse_month_abbreviation(name: &str) -> Option<Month> {
    [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ]
    .into_iter()
    .find(|&month| month_abbreviation(month) == name)
}

fn serialize_month_abbreviation<S: Serializer>(
    month: &Month,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(month_abbreviation(*month))
}

/// The first and last calendar date of `month` in `year`.
pub fn month_bounds(year: i32, month: Month) -> Result<RangeInclusive<Date>, Error> {
    let start = Date::from_calendar_date(year, month, 1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;
    let end = Date::from_calendar_date(year, month, month.length(year))
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    Ok(start..=end)
}

/// Reduces `transactions` into one [DailySummary] per day of `month`,
/// ascending by day.
///
/// Transactions dated outside `month` are ignored, so the caller may pass an
/// unfiltered slice. Days without transactions produce no summary, meaning
/// an empty input yields an empty vector.
pub fn daily_summaries(transactions: &[Transaction], month: Month) -> Vec<DailySummary> {
    let mut summaries_by_day: HashMap<u8, DailySummary> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.date().month() == month)
    {
        let day = transaction.date().day();
        let summary = summaries_by_day.entry(day).or_insert(DailySummary {
            day,
            month,
            income: 0.0,
            expense: 0.0,
            transaction_count: 0,
        });

        match transaction.kind() {
            TransactionKind::Income => summary.income += transaction.amount(),
            TransactionKind::Expense => summary.expense += transaction.amount(),
        }

        summary.transaction_count += 1;
    }

    let mut summaries: Vec<DailySummary> = summaries_by_day.into_values().collect();
    summaries.sort_by_key(|summary| summary.day);

    summaries
}

/// Computes the daily summaries for the given user, month and year.
///
/// `year` deliberately restricts the query: the dashboard only ever asks for
/// the current year, but keeping the year a parameter means cross-year
/// reports only need a new caller, not a new reduction.
///
/// A user or month with no transactions produces an empty vector, not an
/// error.
///
/// # Errors
/// This function will return an [Error::SqlError] if the underlying ledger
/// query fails.
pub fn monthly_summary(
    user_id: UserID,
    month: Month,
    year: i32,
    connection: &Connection,
) -> Result<Vec<DailySummary>, Error> {
    let bounds = month_bounds(year, month)?;
    let transactions = Transaction::select_by_user_in_range(user_id, bounds, connection)?;

    Ok(daily_summaries(&transactions, month))
}

#[cfg(test)]
mod month_abbreviation_tests {
    use time::Month;

    use super::{month_abbreviation, parse_month_abbreviation};

    #[test]
    fn formats_three_letter_abbreviations() {
        assert_eq!(month_abbreviation(Month::January), "Jan");
        assert_eq!(month_abbreviation(Month::September), "Sep");
        assert_eq!(month_abbreviation(Month::December), "Dec");
    }

    #[test]
    fn parse_round_trips_every_month() {
        let mut month = Month::January;

        for _ in 0..12 {
            assert_eq!(parse_month_abbreviation(month_abbreviation(month)), Some(month));
            month = month.next();
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(parse_month_abbreviation("mar"), None);
        assert_eq!(parse_month_abbreviation("MAR"), None);
        assert_eq!(parse_month_abbreviation("Mar"), Some(Month::March));
    }

    #[test]
    fn parse_rejects_full_month_names() {
        assert_eq!(parse_month_abbreviation("March"), None);
        assert_eq!(parse_month_abbreviation(""), None);
    }
}
