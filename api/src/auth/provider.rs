use async_trait::async_trait;
use axum::http::request::Parts;
use berth_common::caller::Caller;

use super::error::AuthError;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Attempt to authenticate from request parts.
    ///
    /// Returns [`AuthError::MissingCredentials`] when the request carries no
    /// credentials this provider understands, so the next one can try.
    async fn authenticate(&self, parts: &Parts) -> Result<Caller, AuthError>;

    /// Name of this auth scheme (for debugging/logging)
    fn scheme(&self) -> &'static str;
}
