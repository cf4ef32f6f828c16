//! This file defines the type `Transaction`, the core type of the ledger part
//! of the application, and the queries the rest of the app uses to read and
//! write the ledger.

use std::ops::RangeInclusive;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Category, DatabaseID, UserID},
};

/// Whether a transaction brought money in or sent money out.
///
/// Amounts are unsigned, the kind carries the direction of the cash flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. wages.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionKind {
    /// The kind as the literal stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction kind {other:?}").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build]. To retrieve
/// existing transactions, use [Transaction::select] to get a transaction by
/// its ID and the `select_by_user*` functions to get transactions by user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    id: DatabaseID,
    amount: f64,
    date: Date,
    kind: TransactionKind,
    description: String,
    category_id: DatabaseID,
    user_id: UserID,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder::new] for discoverability.
    pub fn build(
        amount: f64,
        kind: TransactionKind,
        category_id: DatabaseID,
        user_id: UserID,
    ) -> TransactionBuilder {
        TransactionBuilder::new(amount, kind, category_id, user_id)
    }

    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The amount of money spent or earned in this transaction.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// When the transaction happened.
    pub fn date(&self) -> &Date {
        &self.date
    }

    /// Whether this transaction is income or an expense.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// A text description of what the transaction was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The user-defined category that describes the type of the transaction.
    pub fn category_id(&self) -> DatabaseID {
        self.category_id
    }

    /// The ID of the user that created this transaction.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn select(id: DatabaseID, connection: &Connection) -> Result<Transaction, Error> {
        connection
            .prepare(
                "SELECT id, amount, date, kind, description, category_id, user_id \
                FROM \"transaction\" WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Transaction::map_row)
            .map_err(|e| e.into())
    }

    /// Retrieve the transactions in the database that have `user_id`.
    ///
    /// An empty vector is returned if the specified user has no transactions.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    pub fn select_by_user(
        user_id: UserID,
        connection: &Connection,
    ) -> Result<Vec<Transaction>, Error> {
        connection
            .prepare(
                "SELECT id, amount, date, kind, description, category_id, user_id \
                FROM \"transaction\" WHERE user_id = :user_id",
            )?
            .query_map(&[(":user_id", &user_id.as_i64())], Transaction::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|e| e.into()))
            .collect()
    }

    /// Retrieve the transactions that have `user_id` and a date within
    /// `date_range` (inclusive), ordered by date.
    ///
    /// This is the query that feeds the monthly aggregation: the caller
    /// restricts the range to the month (and therefore the year) it wants
    /// summarized.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    pub fn select_by_user_in_range(
        user_id: UserID,
        date_range: RangeInclusive<Date>,
        connection: &Connection,
    ) -> Result<Vec<Transaction>, Error> {
        connection
            .prepare(
                // Sort by date, and then ID to keep transaction order stable
                // after updates.
                "SELECT id, amount, date, kind, description, category_id, user_id \
                FROM \"transaction\" \
                WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 \
                ORDER BY date ASC, id ASC",
            )?
            .query_map(
                (user_id.as_i64(), date_range.start(), date_range.end()),
                Transaction::map_row,
            )?
            .map(|maybe_transaction| maybe_transaction.map_err(|e| e.into()))
            .collect()
    }

    /// Count the transactions that have `user_id` and a date within
    /// `date_range` (inclusive).
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    pub fn count_in_range(
        user_id: UserID,
        date_range: RangeInclusive<Date>,
        connection: &Connection,
    ) -> Result<u64, Error> {
        connection
            .prepare(
                "SELECT COUNT(*) FROM \"transaction\" \
                WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
            )?
            .query_row(
                (user_id.as_i64(), date_range.start(), date_range.end()),
                |row| row.get(0),
            )
            .map_err(|e| e.into())
    }

    /// Retrieve one page of the user's transactions, most recent first.
    ///
    /// `offset` is the number of transactions to skip, `limit` the page size.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    pub fn select_page_by_user(
        user_id: UserID,
        limit: u64,
        offset: u64,
        connection: &Connection,
    ) -> Result<Vec<Transaction>, Error> {
        connection
            .prepare(
                "SELECT id, amount, date, kind, description, category_id, user_id \
                FROM \"transaction\" WHERE user_id = :user_id \
                ORDER BY date DESC, id ASC LIMIT :limit OFFSET :offset",
            )?
            .query_map(
                &[
                    (":user_id", &user_id.as_i64()),
                    (":limit", &(limit as i64)),
                    (":offset", &(offset as i64)),
                ],
                Transaction::map_row,
            )?
            .map(|maybe_transaction| maybe_transaction.map_err(|e| e.into()))
            .collect()
    }

    /// Count all transactions that have `user_id`.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    pub fn count_by_user(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
        connection
            .prepare("SELECT COUNT(*) FROM \"transaction\" WHERE user_id = :user_id")?
            .query_row(&[(":user_id", &user_id.as_i64())], |row| row.get(0))
            .map_err(|e| e.into())
    }

    /// Overwrite the transaction with `id` with the contents of `builder`,
    /// if the transaction belongs to the builder's user.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NegativeAmount] if the builder's amount is negative,
    /// - [Error::InvalidCategory] if the builder's category does not exist or
    ///   belongs to another user,
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   the builder's user,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn update(
        id: DatabaseID,
        builder: TransactionBuilder,
        connection: &Connection,
    ) -> Result<Transaction, Error> {
        builder.validate(connection)?;

        let rows_affected = connection.execute(
            "UPDATE \"transaction\" \
            SET amount = ?1, date = ?2, kind = ?3, description = ?4, category_id = ?5 \
            WHERE id = ?6 AND user_id = ?7",
            (
                builder.amount,
                &builder.date,
                builder.kind,
                &builder.description,
                builder.category_id,
                id,
                builder.user_id.as_i64(),
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(Transaction {
            id,
            amount: builder.amount,
            date: builder.date,
            kind: builder.kind,
            description: builder.description,
            category_id: builder.category_id,
            user_id: builder.user_id,
        })
    }

    /// Delete the transaction with `id` if it belongs to `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn delete(id: DatabaseID, user_id: UserID, connection: &Connection) -> Result<(), Error> {
        let rows_affected = connection.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_affected == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for Transaction {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection
                .execute(
                    "CREATE TABLE \"transaction\" (
                            id INTEGER PRIMARY KEY,
                            amount REAL NOT NULL,
                            date TEXT NOT NULL,
                            kind TEXT NOT NULL,
                            description TEXT NOT NULL,
                            category_id INTEGER NOT NULL,
                            user_id INTEGER NOT NULL,
                            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
                            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                            )",
                    (),
                )?;

        Ok(())
    }
}

impl MapRow for Transaction {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(offset)?,
            amount: row.get(offset + 1)?,
            date: row.get(offset + 2)?,
            kind: row.get(offset + 3)?,
            description: row.get(offset + 4)?,
            category_id: row.get(offset + 5)?,
            user_id: UserID::new(row.get(offset + 6)?),
        })
    }
}

/// Builder for creating a new [Transaction].
///
/// The function for finalizing the builder is [TransactionBuilder::insert].
#[derive(Debug, PartialEq)]
pub struct TransactionBuilder {
    amount: f64,
    date: Date,
    kind: TransactionKind,
    description: String,
    category_id: DatabaseID,
    user_id: UserID,
}

impl TransactionBuilder {
    /// Create a builder for a transaction that is not yet in the application
    /// database. The date defaults to today.
    ///
    /// Finalize the builder with [TransactionBuilder::insert].
    pub fn new(
        amount: f64,
        kind: TransactionKind,
        category_id: DatabaseID,
        user_id: UserID,
    ) -> Self {
        Self {
            amount,
            date: OffsetDateTime::now_utc().date(),
            kind,
            description: String::new(),
            category_id,
            user_id,
        }
    }

    /// Set the date for the transaction.
    ///
    /// # Errors
    /// This function will return an error if `date` is a date in the future.
    pub fn date(mut self, date: Date) -> Result<Self, Error> {
        if date > OffsetDateTime::now_utc().date() {
            return Err(Error::FutureDate(date));
        }

        self.date = date;
        Ok(self)
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Check the invariants that SQLite cannot enforce for us: a
    /// non-negative amount and a category owned by the transaction's user.
    fn validate(&self, connection: &Connection) -> Result<(), Error> {
        if self.amount < 0.0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        let category = Category::select(self.category_id, connection).map_err(|e| match e {
            // A 'not found' error does not make sense on a write, so we
            // instead indicate that the category id (a foreign key) is
            // invalid.
            Error::NotFound => Error::InvalidCategory,
            e => e,
        })?;

        if self.user_id != category.user_id() {
            // The server should not give any information indicating to the client that the category exists or belongs to another user,
            // so we give the same error as if the referenced category does not exist.
            return Err(Error::InvalidCategory);
        }

        Ok(())
    }

    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NegativeAmount] if the amount is negative,
    /// - [Error::InvalidCategory] if `category_id` does not refer to a
    ///   category owned by the transaction's user,
    /// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn insert(self, connection: &Connection) -> Result<Transaction, Error> {
        self.validate(connection)?;

        connection.execute(
            "INSERT INTO \"transaction\" (amount, date, kind, description, category_id, user_id) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                self.amount,
                &self.date,
                self.kind,
                &self.description,
                self.category_id,
                self.user_id.as_i64(),
            ),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Transaction {
            id,
            amount: self.amount,
            date: self.date,
            kind: self.kind,
            description: self.description,
            category_id: self.category_id,
            user_id: self.user_id,
        })
    }
}
