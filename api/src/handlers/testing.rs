//! Drives the full router, middleware included, against in-memory storage.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use berth_db::{
    models::DbUser,
    storage::{UserStore, memory::MemoryStorage},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{config::BerthApiConfig, server};

pub(crate) struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub(crate) struct TestApi {
    router: Router,
    pub db: Arc<MemoryStorage>,
}

impl TestApi {
    pub fn new() -> Self {
        let db = Arc::new(MemoryStorage::new());
        let (router, _) = server::make(BerthApiConfig::default(), db.clone()).unwrap();
        Self { router, db }
    }

    /// Register a user and return their API token.
    pub async fn user(&self, username: &str, is_admin: bool) -> String {
        let (user, token) = DbUser::with_new_token(username.into(), is_admin);
        UserStore::create(&*self.db, user).await.unwrap();
        token
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("token {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Response {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Response {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    /// Create an app owned by the holder of `token`, asserting success.
    pub async fn app(&self, token: &str, id: &str) {
        let response = self.post("/v1/apps", token, json!({ "id": id })).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    }
}

pub(crate) fn cert_body(cert: &str, key: &str) -> Value {
    json!({ "cert": cert, "key": key })
}
