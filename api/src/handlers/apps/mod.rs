use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use berth_common::{
    caller::{Caller, CallerError},
    guard::{self, Operation},
    params::{AddCollaboratorParams, CreateAppParams, PaginationParams},
    views::{App, PaginatedList},
};
use berth_db::{
    models::{AppMember, DbApp},
    storage::{AppFilter, AppStore, UserStore},
};
use tracing::info;
use ulid::Ulid;

use crate::{auth::Auth, context::ApiContext, error::ApiError, handlers::paginate};

#[cfg(test)]
mod tests;

const MAX_APP_ID_LEN: usize = 63;

/// App IDs are DNS labels: lowercase alphanumerics and inner hyphens.
fn is_valid_app_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    let edge_ok = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    !bytes.is_empty()
        && bytes.len() <= MAX_APP_ID_LEN
        && bytes.first().is_some_and(edge_ok)
        && bytes.last().is_some_and(edge_ok)
        && bytes.iter().all(|b| edge_ok(b) || *b == b'-')
}

/// Look up an app and check `caller` may perform `operation` on it.
async fn resolve_app(
    ctx: &ApiContext,
    caller: &Caller,
    app_id: &str,
    operation: Operation,
) -> Result<DbApp, ApiError> {
    let app = AppStore::get(&*ctx.db, app_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    guard::authorize(caller, &app, operation)?;
    Ok(app)
}

#[utoipa::path(
    post,
    path = "/v1/apps",
    tags = ["apps"],
    request_body(content = CreateAppParams, content_type = "application/json"),
    responses(
        (status = 201, description = "App created", body = App),
        (status = 400, description = "Invalid or duplicate app ID", body = berth_common::views::ApiErrorResponse),
    )
)]
pub async fn create_app(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Json(params): Json<CreateAppParams>,
) -> Result<(StatusCode, Json<App>), ApiError> {
    let Caller::User { id, username, .. } = &caller else {
        return Err(CallerError::forbidden("apps:create").into());
    };

    let app_id = params
        .id
        .unwrap_or_else(|| Ulid::new().to_string().to_lowercase());
    if !is_valid_app_id(&app_id) {
        return Err(ApiError::bad_request(format!(
            "App ID {app_id:?} must be a lowercase DNS label of at most {MAX_APP_ID_LEN} characters"
        )));
    }

    let owner = AppMember {
        id: id.clone(),
        username: username.clone(),
    };
    let app = AppStore::create(&*ctx.db, DbApp::new(app_id, owner)).await?;

    info!(app_id = %app.id, %caller, "App created");
    Ok((StatusCode::CREATED, Json(app.into())))
}

#[utoipa::path(
    get,
    path = "/v1/apps",
    tags = ["apps"],
    params(PaginationParams),
    responses((status = 200, description = "Apps visible to the caller", body = PaginatedList<App>))
)]
pub async fn list_apps(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Query(query): Query<PaginationParams>,
) -> Result<Json<PaginatedList<App>>, ApiError> {
    let filter = if caller.is_admin() {
        AppFilter::default()
    } else {
        AppFilter {
            member_id: caller.user_id().map(str::to_string),
        }
    };

    let apps = AppStore::list(&*ctx.db, filter).await?;
    Ok(Json(paginate(apps, &query)?))
}

#[utoipa::path(
    get,
    path = "/v1/apps/{app_id}",
    tags = ["apps"],
    params(("app_id" = String, Path, description = "App ID")),
    responses((status = 200, description = "Resolved app", body = App))
)]
pub async fn get_app(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(app_id): Path<String>,
) -> Result<Json<App>, ApiError> {
    let app = resolve_app(&ctx, &caller, &app_id, Operation::ViewApp).await?;
    Ok(Json(app.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/apps/{app_id}",
    tags = ["apps"],
    params(("app_id" = String, Path, description = "App ID")),
    responses((status = 204, description = "App and its certificates deleted"))
)]
pub async fn delete_app(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(app_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let app = resolve_app(&ctx, &caller, &app_id, Operation::DeleteApp).await?;
    AppStore::delete(&*ctx.db, &app.id).await?;

    info!(app_id = %app.id, %caller, "App deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/apps/{app_id}/perms",
    tags = ["apps"],
    params(("app_id" = String, Path, description = "App ID")),
    request_body(content = AddCollaboratorParams, content_type = "application/json"),
    responses((status = 201, description = "Collaborator added", body = App))
)]
pub async fn add_collaborator(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(app_id): Path<String>,
    Json(params): Json<AddCollaboratorParams>,
) -> Result<(StatusCode, Json<App>), ApiError> {
    let app = resolve_app(&ctx, &caller, &app_id, Operation::ManageCollaborators).await?;

    let user = UserStore::get_by_username(&*ctx.db, &params.username)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let member = AppMember {
        id: user.id.to_string(),
        username: user.username,
    };
    let app = AppStore::add_collaborator(&*ctx.db, &app.id, member).await?;

    info!(app_id = %app.id, username = %params.username, "Collaborator added");
    Ok((StatusCode::CREATED, Json(app.into())))
}

#[utoipa::path(
    delete,
    path = "/v1/apps/{app_id}/perms/{username}",
    tags = ["apps"],
    params(
        ("app_id" = String, Path, description = "App ID"),
        ("username" = String, Path, description = "Collaborator to remove"),
    ),
    responses((status = 204, description = "Collaborator removed"))
)]
pub async fn remove_collaborator(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path((app_id, username)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let app = resolve_app(&ctx, &caller, &app_id, Operation::ManageCollaborators).await?;

    let user = UserStore::get_by_username(&*ctx.db, &username)
        .await?
        .ok_or_else(ApiError::not_found)?;

    AppStore::remove_collaborator(&*ctx.db, &app.id, &user.id.to_string()).await?;

    info!(app_id = %app.id, %username, "Collaborator removed");
    Ok(StatusCode::NO_CONTENT)
}
