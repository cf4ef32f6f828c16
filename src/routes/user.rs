//! Route handlers for registering a user and fetching the authenticated
//! user's profile.

use axum::{Json, extract::State, http::StatusCode};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::Claims,
    models::{PasswordHash, User},
    state::AppState,
};

/// The data a client sends to register a user.
#[derive(Debug, Deserialize)]
pub struct RegisterUserData {
    /// The new user's email address.
    pub email: String,
    /// The new user's password in plain text.
    pub password: String,
}

/// A user as returned by the API. The password hash never leaves the server.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    /// The user's ID.
    pub id: i64,
    /// The user's email address.
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_i64(),
            email: user.email().to_string(),
        }
    }
}

/// Handler for registering a user.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidEmail] if the email is not a valid email address,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the email is already registered.
pub async fn create_user(
    State(state): State<AppState>,
    Json(data): Json<RegisterUserData>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    let email: EmailAddress = data
        .email
        .parse()
        .map_err(|_| Error::InvalidEmail(data.email.clone()))?;

    let password_hash = PasswordHash::from_raw_password(&data.password, PasswordHash::DEFAULT_COST)?;

    let connection = state.db_connection().lock().unwrap();
    let user = User::build(email, password_hash).insert(&connection)?;

    tracing::info!("registered user {}", user.id());

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Handler for fetching the authenticated user's profile.
pub async fn get_me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<UserResponse>, Error> {
    let connection = state.db_connection().lock().unwrap();
    let user = User::select_by_id(claims.user_id(), &connection)?;

    Ok(Json(UserResponse::from(&user)))
}
