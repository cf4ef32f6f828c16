//! Authentication for the JSON API.
//!
//! Log-in verifies a user's credentials and issues a signed JWT. Protected
//! route handlers take a [Claims] argument, which is extracted from the
//! request's bearer token and rejects the request with a 401 when the token
//! is missing, malformed or expired.

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use email_address::EmailAddress;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    models::{User, UserID},
    state::AppState,
};

/// How long an auth token stays valid.
pub const TOKEN_DURATION: Duration = Duration::hours(24);

/// How long an auth token stays valid when the user asks to be remembered.
pub const REMEMBER_ME_TOKEN_DURATION: Duration = Duration::days(30);

/// The payload of a signed auth token.
///
/// Functions as an extractor: a route handler that takes `Claims` as an
/// argument only runs for requests carrying a valid bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the authenticated user.
    sub: i64,
    /// When the token was issued, as a unix timestamp.
    iat: i64,
    /// When the token expires, as a unix timestamp.
    exp: i64,
}

impl Claims {
    /// The ID of the user the token was issued to.
    pub fn user_id(&self) -> UserID {
        UserID::new(self.sub)
    }
}

impl<S> FromRequestParts<S> for Claims
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::InvalidAuthToken)?;

        let state = AppState::from_ref(state);

        decode_jwt(bearer.token(), state.jwt_decoding_key())
    }
}

/// Create a signed auth token for `user_id` that expires after `valid_for`.
///
/// # Errors
/// This function will return an [Error::HashingError] if the token could not
/// be signed, which indicates a server misconfiguration.
pub fn encode_jwt(
    user_id: UserID,
    valid_for: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();

    let claims = Claims {
        sub: user_id.as_i64(),
        iat: now.unix_timestamp(),
        exp: (now + valid_for).unix_timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::HashingError(error.to_string()))
}

/// Verify a signed auth token and return its claims.
///
/// # Errors
/// This function will return an [Error::InvalidAuthToken] if the token is
/// malformed, has an invalid signature or has expired.
pub fn decode_jwt(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|_| Error::InvalidAuthToken)
}

/// The credentials a user logs in with.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// The user's email address.
    pub email: String,
    /// The user's password in plain text.
    pub password: String,
    /// Whether to issue a long-lived token. Defaults to false.
    #[serde(default)]
    pub remember_me: bool,
}

/// The response to a successful log-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The bearer token to send with subsequent requests.
    pub token: String,
}

/// Handler for log-in requests.
///
/// # Errors
/// This function will return an [Error::InvalidCredentials] if the email
/// does not belong to a user or the password does not match. The two cases
/// are indistinguishable to the client on purpose.
pub async fn log_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LogInResponse>, Error> {
    let email: EmailAddress = credentials
        .email
        .parse()
        .map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = state.db_connection().lock().unwrap();

        User::select(&email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    let password_is_correct = user
        .password_hash()
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let valid_for = if credentials.remember_me {
        REMEMBER_ME_TOKEN_DURATION
    } else {
        TOKEN_DURATION
    };

    let token = encode_jwt(user.id(), valid_for, state.jwt_encoding_key())?;

    tracing::info!("user {} logged in", user.id());

    Ok(Json(LogInResponse { token }))
}

#[cfg(test)]
mod jwt_tests {
    use jsonwebtoken::{DecodingKey, EncodingKey};
    use time::Duration;

    use crate::{Error, models::UserID};

    use super::{decode_jwt, encode_jwt};

    #[test]
    fn encode_then_decode_returns_user_id() {
        let encoding_key = EncodingKey::from_secret(b"secret");
        let decoding_key = DecodingKey::from_secret(b"secret");

        let token = encode_jwt(UserID::new(42), Duration::hours(1), &encoding_key).unwrap();
        let claims = decode_jwt(&token, &decoding_key).unwrap();

        assert_eq!(claims.user_id(), UserID::new(42));
    }

    #[test]
    fn decode_rejects_expired_token() {
        let encoding_key = EncodingKey::from_secret(b"secret");
        let decoding_key = DecodingKey::from_secret(b"secret");

        // Expired well past the default validation leeway.
        let token = encode_jwt(UserID::new(42), Duration::hours(-2), &encoding_key).unwrap();

        assert_eq!(decode_jwt(&token, &decoding_key), Err(Error::InvalidAuthToken));
    }

    #[test]
    fn decode_rejects_token_signed_with_other_key() {
        let encoding_key = EncodingKey::from_secret(b"secret");
        let decoding_key = DecodingKey::from_secret(b"a different secret");

        let token = encode_jwt(UserID::new(42), Duration::hours(1), &encoding_key).unwrap();

        assert_eq!(decode_jwt(&token, &decoding_key), Err(Error::InvalidAuthToken));
    }

    #[test]
    fn decode_rejects_garbage() {
        let decoding_key = DecodingKey::from_secret(b"secret");

        assert_eq!(
            decode_jwt("not.a.token", &decoding_key),
            Err(Error::InvalidAuthToken)
        );
    }
}

#[cfg(test)]
mod log_in_tests {
    use axum::{
        Router,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        db::initialize,
        models::{PasswordHash, User},
        state::AppState,
    };

    use super::{Claims, LogInResponse, log_in};

    const TEST_PASSWORD: &str = "averysafeandsecurepassword";

    async fn protected(claims: Claims) -> String {
        claims.user_id().to_string()
    }

    fn new_test_server() -> (TestServer, User) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = User::build(
            "foo@bar.baz".parse().unwrap(),
            PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap(),
        )
        .insert(&conn)
        .unwrap();

        let app = Router::new()
            .route("/api/log_in", post(log_in))
            .route("/protected", get(protected))
            .with_state(AppState::new(conn, "secret"));

        (TestServer::new(app), user)
    }

    #[tokio::test]
    async fn log_in_with_valid_credentials_returns_working_token() {
        let (server, user) = new_test_server();

        let response = server
            .post("/api/log_in")
            .json(&json!({"email": "foo@bar.baz", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        let LogInResponse { token } = response.json();

        let protected_response = server.get("/protected").authorization_bearer(&token).await;

        protected_response.assert_status_ok();
        protected_response.assert_text(user.id().to_string());
    }

    #[tokio::test]
    async fn log_in_with_wrong_password_returns_401() {
        let (server, _user) = new_test_server();

        let response = server
            .post("/api/log_in")
            .json(&json!({"email": "foo@bar.baz", "password": "wrong password"}))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn log_in_with_unknown_email_returns_401() {
        let (server, _user) = new_test_server();

        let response = server
            .post("/api/log_in")
            .json(&json!({"email": "who@dis.com", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn protected_route_without_token_returns_401() {
        let (server, _user) = new_test_server();

        let response = server.get("/protected").await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn protected_route_with_tampered_token_returns_401() {
        let (server, _user) = new_test_server();

        let response = server
            .get("/protected")
            .authorization_bearer("ey.tampered.token")
            .await;

        response.assert_status_unauthorized();
    }
}
