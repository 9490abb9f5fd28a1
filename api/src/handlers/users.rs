use axum::{Json, extract::State};
use berth_common::{caller::Caller, views::User};
use berth_db::storage::UserStore;

use crate::{auth::Auth, context::ApiContext, error::ApiError};

#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tags = ["auth"],
    responses((status = 200, description = "User information", body = User))
)]
pub async fn auth_whoami(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
) -> Result<Json<User>, ApiError> {
    let Caller::User { id, .. } = &caller else {
        return Err(ApiError::not_found());
    };

    let user = UserStore::get(&*ctx.db, id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(user.into()))
}
