//! This file defines the `Category` type and the types needed to create a category.
//! A category acts like a label for a transaction, however a transaction may
//! only have one category.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, UserID},
};

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    /// This function will return an error if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`,
    /// because if the non-empty invariant is violated it will cause incorrect
    /// behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for expenses and income, e.g., 'Groceries', 'Eating Out', 'Wages'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    id: DatabaseID,
    name: CategoryName,
    user_id: UserID,
}

impl Category {
    /// The id of the category.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The name of the category.
    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    /// The id of the user that created the category.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// Create a new category in the database, owned by `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn insert(
        name: CategoryName,
        user_id: UserID,
        connection: &Connection,
    ) -> Result<Self, Error> {
        connection.execute(
            "INSERT INTO category (name, user_id) VALUES (?1, ?2)",
            (name.as_ref(), user_id.as_i64()),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Self { id, name, user_id })
    }

    /// Retrieve a category in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid category,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn select(id: DatabaseID, connection: &Connection) -> Result<Self, Error> {
        connection
            .prepare("SELECT id, name, user_id FROM category WHERE id = :id")?
            .query_row(&[(":id", &id)], Category::map_row)
            .map_err(|e| e.into())
    }

    /// Retrieve the categories in the database that belong to `user_id`.
    ///
    /// An empty vector is returned if the specified user has no categories.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL error.
    pub fn select_by_user(user_id: UserID, connection: &Connection) -> Result<Vec<Self>, Error> {
        connection
            .prepare("SELECT id, name, user_id FROM category WHERE user_id = :user_id")?
            .query_map(&[(":user_id", &user_id.as_i64())], Category::map_row)?
            .map(|maybe_category| maybe_category.map_err(|e| e.into()))
            .collect()
    }

    /// Delete the category with `id` if it belongs to `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a category owned by `user_id`,
    /// - [Error::SqlError] if there is some other SQL error.
    pub fn delete(id: DatabaseID, user_id: UserID, connection: &Connection) -> Result<(), Error> {
        let rows_affected = connection.execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_affected == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }
}

impl MapRow for Category {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        let id = row.get(offset)?;

        let raw_name: String = row.get(offset + 1)?;
        let name = CategoryName::new_unchecked(&raw_name);

        let raw_user_id = row.get(offset + 2)?;
        let user_id = UserID::new(raw_user_id);

        Ok(Self { id, name, user_id })
    }
}

impl CreateTable for Category {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}


#[cfg(test)]
mod category_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{Category, CategoryName, PasswordHash, User, UserID},
    };

    fn create_database_and_insert_test_user() -> (Connection, User) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let test_user = User::build(
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
        )
        .insert(&conn)
        .unwrap();

        (conn, test_user)
    }

    #[test]
    fn insert_category_succeeds() {
        let (conn, test_user) = create_database_and_insert_test_user();

        let name = CategoryName::new("Categorically a category").unwrap();

        let category = Category::insert(name.clone(), test_user.id(), &conn).unwrap();

        assert!(category.id() > 0);
        assert_eq!(category.name(), &name);
        assert_eq!(category.user_id(), test_user.id());
    }

    #[test]
    fn insert_category_fails_with_invalid_user_id() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let maybe_category =
            Category::insert(CategoryName::new_unchecked("Foo"), UserID::new(42), &conn);

        assert_eq!(maybe_category, Err(Error::InvalidUser));
    }

    #[test]
    fn select_category_succeeds() {
        let (conn, test_user) = create_database_and_insert_test_user();
        let inserted_category =
            Category::insert(CategoryName::new_unchecked("Foo"), test_user.id(), &conn).unwrap();

        let selected_category = Category::select(inserted_category.id(), &conn).unwrap();

        assert_eq!(inserted_category, selected_category);
    }

    #[test]
    fn select_category_fails_with_invalid_id() {
        let (conn, _test_user) = create_database_and_insert_test_user();

        let selected_category = Category::select(1337, &conn);

        assert_eq!(selected_category, Err(Error::NotFound));
    }

    #[test]
    fn select_category_with_user_id() {
        let (conn, test_user) = create_database_and_insert_test_user();
        let inserted_categories = vec![
            Category::insert(CategoryName::new_unchecked("Foo"), test_user.id(), &conn).unwrap(),
            Category::insert(CategoryName::new_unchecked("Bar"), test_user.id(), &conn).unwrap(),
        ];

        let selected_categories = Category::select_by_user(test_user.id(), &conn).unwrap();

        assert_eq!(inserted_categories, selected_categories);
    }

    #[test]
    fn select_category_with_invalid_user_id_returns_empty_vec() {
        let (conn, test_user) = create_database_and_insert_test_user();

        Category::insert(CategoryName::new_unchecked("Foo"), test_user.id(), &conn).unwrap();

        let selected_categories =
            Category::select_by_user(UserID::new(test_user.id().as_i64() + 1), &conn).unwrap();

        assert_eq!(selected_categories, []);
    }

    #[test]
    fn delete_category_succeeds() {
        let (conn, test_user) = create_database_and_insert_test_user();
        let category =
            Category::insert(CategoryName::new_unchecked("Foo"), test_user.id(), &conn).unwrap();

        Category::delete(category.id(), test_user.id(), &conn).unwrap();

        assert_eq!(Category::select(category.id(), &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_category_fails_for_other_users_category() {
        let (conn, test_user) = create_database_and_insert_test_user();
        let category =
            Category::insert(CategoryName::new_unchecked("Foo"), test_user.id(), &conn).unwrap();

        let result = Category::delete(
            category.id(),
            UserID::new(test_user.id().as_i64() + 1),
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
    }
}
