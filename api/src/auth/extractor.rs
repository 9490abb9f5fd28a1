use std::future::Future;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use berth_common::caller::{Caller, CallerError};

use crate::{auth::AuthError, context::ApiContext, error::ApiError};

/// Extractor that requires an authenticated caller.
///
/// Rejects the request with 401 Unauthorized when no provider accepts it, and
/// with 500 when the credentials could not be checked at all.
///
/// ```rust,ignore
/// pub async fn list_certificates(
///     State(ctx): State<ApiContext>,
///     Auth(caller): Auth,
///     Path(app_id): Path<String>,
/// ) -> Result<Json<PaginatedList<Certificate>>, ApiError> {
///     let records = ctx.certs.list(&caller, &app_id).await?;
///     // ...
/// }
/// ```
pub struct Auth(pub Caller);

impl FromRequestParts<ApiContext> for Auth {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &ApiContext,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let auth_manager = Arc::clone(&state.auth_manager);
        async move {
            let caller = auth_manager.authenticate(parts).await.map_err(|e| match e {
                AuthError::Storage(e) => ApiError::Storage(e),
                e => ApiError::CallerError(CallerError::unauthorized(Some(e.to_string()))),
            })?;
            Ok(Auth(caller))
        }
    }
}
