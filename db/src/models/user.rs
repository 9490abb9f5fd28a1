use std::fmt::Display;

use berth_common::{
    caller::{Caller, Role},
    views::User,
};
use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

const TOKEN_LENGTH: usize = 40;

/// Generate a fresh API token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// The form in which API tokens are persisted and looked up.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbUser {
    #[serde(rename = "_id")]
    pub id: Ulid,
    pub username: String,

    /// Hex-encoded SHA-256 of the user's API token. The token itself is
    /// only ever shown once, when it is issued.
    pub token_hash: String,

    pub is_admin: bool,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Display for DbUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DbUser {{ id: {}, username: {}, is_admin: {} }}",
            self.id, self.username, self.is_admin
        )
    }
}

impl DbUser {
    pub fn new(username: String, token_hash: String, is_admin: bool) -> Self {
        Self {
            id: Ulid::new(),
            username,
            token_hash,
            is_admin,
            created_at: Utc::now(),
        }
    }

    /// Create a user with a newly generated token, returning the token
    /// alongside the record.
    pub fn with_new_token(username: String, is_admin: bool) -> (Self, String) {
        let token = generate_token();
        (Self::new(username, hash_token(&token), is_admin), token)
    }

    /// Convert this database user into a Caller for permission checking.
    pub fn to_caller(&self) -> Caller {
        let roles = if self.is_admin { vec![Role::Admin] } else { vec![] };
        Caller::User {
            id: self.id.to_string(),
            username: self.username.clone(),
            roles,
        }
    }
}

impl From<DbUser> for User {
    fn from(value: DbUser) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username,
            is_admin: value.is_admin,
            created_at: value.created_at,
        }
    }
}
