//! Defines the state shared between route handlers.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;

/// The state shared between the route handlers.
///
/// The database connection is guarded by a mutex, handlers take the lock for
/// the duration of their queries. The JWT keys are derived once from the
/// server secret at start-up.
#[derive(Clone)]
pub struct AppState {
    /// The connection to the server's database.
    db_connection: Arc<Mutex<Connection>>,
    jwt_encoding_key: Arc<EncodingKey>,
    jwt_decoding_key: Arc<DecodingKey>,
}

impl AppState {
    /// Create the application state.
    ///
    /// `jwt_secret` is the secret used to sign and verify auth tokens. All
    /// server instances that should accept each other's tokens must share it.
    pub fn new(db_connection: Connection, jwt_secret: &str) -> Self {
        Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_encoding_key: Arc::new(EncodingKey::from_secret(jwt_secret.as_bytes())),
            jwt_decoding_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
        }
    }

    /// The mutex-guarded connection to the server's database.
    pub fn db_connection(&self) -> &Mutex<Connection> {
        &self.db_connection
    }

    /// The key used to sign auth tokens.
    pub fn jwt_encoding_key(&self) -> &EncodingKey {
        &self.jwt_encoding_key
    }

    /// The key used to verify auth tokens.
    pub fn jwt_decoding_key(&self) -> &DecodingKey {
        &self.jwt_decoding_key
    }
}
