use axum::http::request::Parts;
use berth_common::caller::Caller;
use tracing::{debug, instrument, trace};

use super::{error::AuthError, provider::AuthProvider};

/// Coordinates multiple authentication providers in priority order.
///
/// Providers are tried in registration order:
///
/// 1. A provider returning `MissingCredentials` defers to the next one.
/// 2. The first provider to succeed decides the `Caller`.
/// 3. Any other error fails the request immediately.
///
/// # Examples
///
/// ```rust,ignore
/// let auth_manager = AuthManager::new()
///     .with_provider(TokenAuthProvider::new(db.clone()));
///
/// // In extractor:
/// let caller = auth_manager.authenticate(&request_parts).await?;
/// ```
pub struct AuthManager {
    providers: Vec<Box<dyn AuthProvider>>,
}

impl AuthManager {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with_provider<P: AuthProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Try each provider in order until one succeeds
    #[instrument(skip_all)]
    pub async fn authenticate(&self, parts: &Parts) -> Result<Caller, AuthError> {
        for provider in &self.providers {
            trace!(scheme = provider.scheme(), "Trying auth provider");

            match provider.authenticate(parts).await {
                Ok(caller) => {
                    debug!(scheme = provider.scheme(), %caller, "Auth succeeded");
                    return Ok(caller);
                }
                Err(AuthError::MissingCredentials) => {
                    trace!(scheme = provider.scheme(), "No credentials for this scheme");
                    continue;
                }
                Err(e) => {
                    debug!(scheme = provider.scheme(), error = %e, "Auth failed");
                    return Err(e);
                }
            }
        }

        Err(AuthError::MissingCredentials)
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::Request;

    use super::*;

    struct Fixed(Result<Caller, fn() -> AuthError>);

    #[async_trait]
    impl AuthProvider for Fixed {
        async fn authenticate(&self, _parts: &Parts) -> Result<Caller, AuthError> {
            self.0.clone().map_err(|f| f())
        }

        fn scheme(&self) -> &'static str {
            "fixed"
        }
    }

    fn parts() -> Parts {
        Request::builder().body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn no_providers_means_missing_credentials() {
        let err = AuthManager::new().authenticate(&parts()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[tokio::test]
    async fn missing_credentials_fall_through_to_next_provider() {
        let manager = AuthManager::new()
            .with_provider(Fixed(Err(|| AuthError::MissingCredentials)))
            .with_provider(Fixed(Ok(Caller::System)));

        assert_eq!(manager.authenticate(&parts()).await.unwrap(), Caller::System);
    }

    #[tokio::test]
    async fn invalid_credentials_stop_the_chain() {
        let manager = AuthManager::new()
            .with_provider(Fixed(Err(|| AuthError::InvalidCredentials)))
            .with_provider(Fixed(Ok(Caller::System)));

        let err = manager.authenticate(&parts()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
