use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use berth_common::{
    params::{CertificateParams, PaginationParams},
    views::{ApiErrorResponse, Certificate, PaginatedList},
};

use crate::{
    auth::Auth, certs::CertError, context::ApiContext, error::ApiError, handlers::paginate,
};


/// The body is only judged once the app and the caller have been, so a
/// rejection is carried into the service instead of answered here.
fn body(
    json: Result<Json<CertificateParams>, JsonRejection>,
) -> Result<CertificateParams, CertError> {
    json.map(|Json(params)| params)
        .map_err(|rejection| CertError::MalformedBody(rejection.body_text()))
}

#[utoipa::path(
    post,
    path = "/v1/apps/{app_id}/certs",
    tags = ["certs"],
    params(("app_id" = String, Path, description = "App ID")),
    request_body(content = CertificateParams, content_type = "application/json"),
    responses(
        (status = 201, description = "Certificate attached to the app", body = Certificate),
        (status = 400, description = "Malformed body, invalid certificate or key, or the common name is taken", body = ApiErrorResponse),
        (status = 404, description = "App not found", body = ApiErrorResponse),
    )
)]
pub async fn create_certificate(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(app_id): Path<String>,
    json: Result<Json<CertificateParams>, JsonRejection>,
) -> Result<(StatusCode, Json<Certificate>), ApiError> {
    let record = ctx.certs.create(&caller, &app_id, body(json)).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    get,
    path = "/v1/apps/{app_id}/certs",
    tags = ["certs"],
    params(("app_id" = String, Path, description = "App ID"), PaginationParams),
    responses(
        (status = 200, description = "Certificates attached to the app", body = PaginatedList<Certificate>),
        (status = 404, description = "App not found", body = ApiErrorResponse),
    )
)]
pub async fn list_certificates(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path(app_id): Path<String>,
    Query(query): Query<PaginationParams>,
) -> Result<Json<PaginatedList<Certificate>>, ApiError> {
    let records = ctx.certs.list(&caller, &app_id).await?;
    Ok(Json(paginate(records, &query)?))
}

#[utoipa::path(
    get,
    path = "/v1/apps/{app_id}/certs/{common_name}",
    tags = ["certs"],
    params(
        ("app_id" = String, Path, description = "App ID"),
        ("common_name" = String, Path, description = "Certificate common name"),
    ),
    responses(
        (status = 200, description = "Resolved certificate", body = Certificate),
        (status = 404, description = "App or certificate not found", body = ApiErrorResponse),
    )
)]
pub async fn get_certificate(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path((app_id, common_name)): Path<(String, String)>,
) -> Result<Json<Certificate>, ApiError> {
    let record = ctx.certs.get(&caller, &app_id, &common_name).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    put,
    path = "/v1/apps/{app_id}/certs/{common_name}",
    tags = ["certs"],
    params(
        ("app_id" = String, Path, description = "App ID"),
        ("common_name" = String, Path, description = "Certificate common name"),
    ),
    request_body(content = CertificateParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Certificate replaced", body = Certificate),
        (status = 400, description = "Malformed body, invalid certificate or key, or a different common name", body = ApiErrorResponse),
        (status = 404, description = "App or certificate not found", body = ApiErrorResponse),
    )
)]
pub async fn update_certificate(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path((app_id, common_name)): Path<(String, String)>,
    json: Result<Json<CertificateParams>, JsonRejection>,
) -> Result<Json<Certificate>, ApiError> {
    let record = ctx
        .certs
        .update(&caller, &app_id, &common_name, body(json))
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/apps/{app_id}/certs/{common_name}",
    tags = ["certs"],
    params(
        ("app_id" = String, Path, description = "App ID"),
        ("common_name" = String, Path, description = "Certificate common name"),
    ),
    responses(
        (status = 204, description = "Certificate deleted"),
        (status = 404, description = "App or certificate not found", body = ApiErrorResponse),
    )
)]
pub async fn delete_certificate(
    State(ctx): State<ApiContext>,
    Auth(caller): Auth,
    Path((app_id, common_name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    ctx.certs.delete(&caller, &app_id, &common_name).await?;
    Ok(StatusCode::NO_CONTENT)
}
