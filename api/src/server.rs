use std::sync::Arc;

use axum::{
    Router,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
};
use berth_common::views::ApiErrorResponse;
use berth_db::storage::Storage;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{
        ContentBuilder, Info, License, OpenApi, Ref, RefOr, ResponseBuilder, path::Operation,
    },
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{config::BerthApiConfig, context::ApiContext, handlers};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the router and its OpenAPI document on top of an opened storage
/// backend.
pub fn make(cfg: BerthApiConfig, db: Arc<dyn Storage>) -> anyhow::Result<(Router, OpenApi)> {
    let allowed_origin = cfg.public_url.parse::<HeaderValue>()?;
    let context = ApiContext::new(cfg, db);

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    let span = info_span!(
                        "http_request",
                        method = req.method().to_string(),
                        request_id = Option::<&str>::None,
                        path = Option::<&str>::None,
                    );

                    if let Some(request_id) = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                    {
                        span.record("request_id", request_id);
                    }

                    if let Some(path) = req.extensions().get::<MatchedPath>() {
                        span.record("path", path.as_str())
                    } else {
                        span.record("path", req.uri().path())
                    };

                    span
                }),
        )
        .layer(
            CorsLayer::new()
                .allow_credentials(true)
                .allow_origin(allowed_origin)
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let openapi = OpenApi::builder()
        .info(
            Info::builder()
                .title("Berth API Reference")
                .version(env!("CARGO_PKG_VERSION"))
                .license(Some(
                    License::builder()
                        .name("Apache 2.0 License")
                        .identifier(Some(env!("CARGO_PKG_LICENSE")))
                        .build()
                ))
        )
        .build();

    let (r, mut a) = OpenApiRouter::with_openapi(openapi)
        .routes(routes!(handlers::health_check))
        .routes(routes!(handlers::users::auth_whoami))
        .routes(routes!(handlers::apps::create_app, handlers::apps::list_apps))
        .routes(routes!(handlers::apps::get_app, handlers::apps::delete_app))
        .routes(routes!(handlers::apps::add_collaborator))
        .routes(routes!(handlers::apps::remove_collaborator))
        .routes(routes!(
            handlers::certs::create_certificate,
            handlers::certs::list_certificates
        ))
        .routes(routes!(
            handlers::certs::get_certificate,
            handlers::certs::update_certificate,
            handlers::certs::delete_certificate
        ))
        .layer(middleware)
        .with_state(context)
        .split_for_parts();

    a.paths.paths.iter_mut().for_each(|(path, item)| {
        if path == "/health" {
            return;
        }

        apply_default_errors(&mut item.get);
        apply_default_errors(&mut item.post);
        apply_default_errors(&mut item.patch);
        apply_default_errors(&mut item.put);
        apply_default_errors(&mut item.delete);
        apply_default_errors(&mut item.trace);
        apply_default_errors(&mut item.head);
        apply_default_errors(&mut item.options);
    });

    a.components
        .get_or_insert_with(Default::default)
        .schemas
        .entry(ApiErrorResponse::name().into_owned())
        .or_insert_with(ApiErrorResponse::schema);

    Ok((r, a))
}

fn apply_default_errors(item: &mut Option<Operation>) {
    let Some(item) = item else {
        return;
    };

    for (status, description) in [
        ("401", "Unauthorized"),
        ("403", "Forbidden"),
        ("500", "Internal server error"),
    ] {
        item.responses
            .responses
            .entry(status.into())
            .or_insert_with(|| {
                RefOr::T(
                    ResponseBuilder::new()
                        .description(description)
                        .content(
                            "application/json",
                            ContentBuilder::new()
                                .schema(Some(Ref::from_schema_name(ApiErrorResponse::name())))
                                .build(),
                        )
                        .build(),
                )
            });
    }
}
