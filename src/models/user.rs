//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::PasswordHash,
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to
/// better compile time errors, and more flexible generics that can have
/// distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a user ID from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer value of the ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// To create a `User` call [User::build]. To retrieve an existing user, use
/// [User::select] to get a user by email or [User::select_by_id].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    email: EmailAddress,
    password_hash: PasswordHash,
}

impl User {
    /// Build a new user.
    ///
    /// Shortcut for [UserBuilder::new] for discoverability.
    pub fn build(email: EmailAddress, password_hash: PasswordHash) -> UserBuilder {
        UserBuilder::new(email, password_hash)
    }

    /// The user's ID in the database.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The email address associated with the user.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The user's password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Get the user from the database that has the specified `email` address.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such user exists, or [Error::SqlError]
    /// if there is some other SQL error.
    pub fn select(email: &EmailAddress, connection: &Connection) -> Result<Self, Error> {
        connection
            .prepare("SELECT id, email, password FROM user WHERE email = :email")?
            .query_row(&[(":email", &email.to_string())], User::map_row)
            .map_err(|e| e.into())
    }

    /// Get the user from the database that has the specified `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such user exists, or [Error::SqlError]
    /// if there is some other SQL error.
    pub fn select_by_id(id: UserID, connection: &Connection) -> Result<Self, Error> {
        connection
            .prepare("SELECT id, email, password FROM user WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], User::map_row)
            .map_err(|e| e.into())
    }
}

impl MapRow for User {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let raw_email: String = row.get(offset + 1)?;
        let raw_password_hash: String = row.get(offset + 2)?;

        let id = UserID::new(raw_id);
        let email = EmailAddress::new_unchecked(raw_email);
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        Ok(Self {
            id,
            email,
            password_hash,
        })
    }
}

impl CreateTable for User {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE user (
                    id INTEGER PRIMARY KEY,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT UNIQUE NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

/// Builder for creating new [User]s.
///
/// The function for finalizing the builder is [UserBuilder::insert].
pub struct UserBuilder {
    email: EmailAddress,
    password_hash: PasswordHash,
}

impl UserBuilder {
    /// Create a builder for a user that is not yet in the application database.
    ///
    /// Finalize the builder with [UserBuilder::insert].
    pub fn new(email: EmailAddress, password_hash: PasswordHash) -> Self {
        Self {
            email,
            password_hash,
        }
    }

    /// Insert the user into the application database and return the built user.
    /// Note that this function will consume the builder.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateEmail] if the given email address is already in use,
    /// - [Error::DuplicatePassword] if the given password hash already exists
    ///   in the database,
    /// - [Error::SqlError] if there was an unexpected SQL error.
    pub fn insert(self, connection: &Connection) -> Result<User, Error> {
        connection.execute(
            "INSERT INTO user (email, password) VALUES (?1, ?2)",
            (&self.email.to_string(), self.password_hash.to_string()),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
        })
    }
}

#[cfg(test)]
mod user_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{PasswordHash, User},
    };

    fn init_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = init_db();

        let email = EmailAddress::from_str("hello@world.com").unwrap();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = User::build(email.clone(), password_hash.clone())
            .insert(&conn)
            .unwrap();

        assert!(inserted_user.id().as_i64() > 0);
        assert_eq!(inserted_user.email(), &email);
        assert_eq!(inserted_user.password_hash(), &password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let conn = init_db();

        let email = EmailAddress::from_str("hello@world.com").unwrap();

        assert!(
            User::build(email.clone(), PasswordHash::new_unchecked("hunter2"))
                .insert(&conn)
                .is_ok()
        );

        assert_eq!(
            User::build(email.clone(), PasswordHash::new_unchecked("hunter3")).insert(&conn),
            Err(Error::DuplicateEmail)
        );
    }

    #[test]
    fn insert_user_fails_on_duplicate_password() {
        let conn = init_db();

        let password = PasswordHash::new_unchecked("hunter2");

        assert!(
            User::build(
                EmailAddress::from_str("hello@world.com").unwrap(),
                password.clone()
            )
            .insert(&conn)
            .is_ok()
        );

        assert_eq!(
            User::build(
                EmailAddress::from_str("bye@world.com").unwrap(),
                password.clone()
            )
            .insert(&conn),
            Err(Error::DuplicatePassword)
        );
    }

    #[test]
    fn select_user_fails_with_non_existent_email() {
        let conn = init_db();

        // This email is not in the database.
        let email = EmailAddress::from_str("notavalidemail@foo.bar").unwrap();

        assert_eq!(User::select(&email, &conn), Err(Error::NotFound));
    }

    #[test]
    fn select_user_succeeds_with_existing_email() {
        let conn = init_db();

        let test_user = User::build(
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
        )
        .insert(&conn)
        .unwrap();

        let retrieved_user = User::select(test_user.email(), &conn).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn select_user_by_id_succeeds() {
        let conn = init_db();

        let test_user = User::build(
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
        )
        .insert(&conn)
        .unwrap();

        let retrieved_user = User::select_by_id(test_user.id(), &conn).unwrap();

        assert_eq!(retrieved_user, test_user);
    }
}
