//! API token authentication provider.
//!
//! Accepts `Authorization: Bearer <token>` as well as the `token <token>`
//! scheme older clients send. Tokens are looked up by their SHA-256 digest;
//! the plaintext is never stored.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header, request::Parts};
use berth_common::caller::Caller;
use berth_db::{
    models::hash_token,
    storage::{Storage, UserStore},
};
use tracing::{debug, instrument};

use crate::auth::{error::AuthError, provider::AuthProvider};

const SCHEMES: [&str; 2] = ["bearer", "token"];

pub struct TokenAuthProvider {
    db: Arc<dyn Storage>,
}

impl TokenAuthProvider {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    /// Extract the token from the Authorization header. Scheme names are
    /// case-insensitive.
    fn extract_token(headers: &HeaderMap) -> Option<&str> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;

        if !SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
            return None;
        }

        Some(token.trim()).filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    #[instrument(skip(self, parts), fields(scheme = "token"))]
    async fn authenticate(&self, parts: &Parts) -> Result<Caller, AuthError> {
        let token = Self::extract_token(&parts.headers).ok_or(AuthError::MissingCredentials)?;

        let user = UserStore::get_by_token_hash(&*self.db, &hash_token(token))
            .await?
            .ok_or_else(|| {
                debug!("No user holds this token");
                AuthError::InvalidCredentials
            })?;

        debug!(user_id = %user.id, "Token accepted");
        Ok(user.to_caller())
    }

    fn scheme(&self) -> &'static str {
        "token"
    }
}
