use axum::http::{Method, StatusCode};
use serde_json::json;

use super::is_valid_app_id;
use crate::{
    certs::validator::fixtures::*,
    handlers::testing::{TestApi, cert_body},
};

#[test]
fn test_app_id_rules() {
    let longest = "a".repeat(63);
    let too_long = "a".repeat(64);

    for valid in ["a", "test-app", "app1", "0abc", longest.as_str()] {
        assert!(is_valid_app_id(valid), "{valid}");
    }

    for invalid in [
        "",
        "-app",
        "app-",
        "Test-App",
        "test_app",
        "test.app",
        too_long.as_str(),
    ] {
        assert!(!is_valid_app_id(invalid), "{invalid}");
    }
}

#[tokio::test]
async fn create_app_makes_caller_the_owner() {
    let api = TestApi::new();
    let token = api.user("autotest", false).await;

    let created = api.post("/v1/apps", &token, json!({ "id": "test-app" })).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["id"], "test-app");
    assert_eq!(created.body["owner"], "autotest");
    assert_eq!(created.body["collaborators"], json!([]));

    let duplicate = api.post("/v1/apps", &token, json!({ "id": "test-app" })).await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["code"], "AlreadyExists");
}

#[tokio::test]
async fn create_app_generates_an_id_when_omitted() {
    let api = TestApi::new();
    let token = api.user("autotest", false).await;

    let created = api.post("/v1/apps", &token, json!({})).await;
    assert_eq!(created.status, StatusCode::CREATED);

    let id = created.body["id"].as_str().unwrap();
    assert_eq!(id.len(), 26);
    assert!(is_valid_app_id(id));
}

#[tokio::test]
async fn create_app_rejects_invalid_ids() {
    let api = TestApi::new();
    let token = api.user("autotest", false).await;

    let response = api.post("/v1/apps", &token, json!({ "id": "Not_Valid" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "BadRequest");
}

#[tokio::test]
async fn list_apps_shows_memberships_and_everything_to_admins() {
    let api = TestApi::new();
    let alice = api.user("alice", false).await;
    let bob = api.user("bob", false).await;
    let admin = api.user("root", true).await;

    api.app(&alice, "alice-app").await;
    api.app(&bob, "bob-app").await;

    let listed = api.get("/v1/apps", &alice).await;
    let items = listed.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "alice-app");

    let listed = api.get("/v1/apps", &admin).await;
    assert_eq!(listed.body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn get_app_checks_access() {
    let api = TestApi::new();
    let owner = api.user("autotest", false).await;
    let stranger = api.user("autotest-2", false).await;
    api.app(&owner, "test-app").await;

    assert_eq!(api.get("/v1/apps/test-app", &owner).await.status, StatusCode::OK);
    assert_eq!(
        api.get("/v1/apps/test-app", &stranger).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        api.get("/v1/apps/missing", &stranger).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn deleting_an_app_deletes_its_certificates() {
    let api = TestApi::new();
    let owner = api.user("autotest", false).await;
    api.app(&owner, "test-app").await;

    let created = api
        .post("/v1/apps/test-app/certs", &owner, cert_body(TEST_CERT, TEST_KEY))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let deleted = api.delete("/v1/apps/test-app", &owner).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    assert_eq!(
        api.get("/v1/apps/test-app/certs", &owner).await.status,
        StatusCode::NOT_FOUND
    );

    // A new app under the same name starts empty.
    api.app(&owner, "test-app").await;
    let listed = api.get("/v1/apps/test-app/certs", &owner).await;
    assert!(listed.body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn collaborators_cannot_delete_or_share_the_app() {
    let api = TestApi::new();
    let owner = api.user("autotest", false).await;
    let collaborator = api.user("autotest-2", false).await;
    api.user("autotest-3", false).await;
    api.app(&owner, "test-app").await;

    let added = api
        .post(
            "/v1/apps/test-app/perms",
            &owner,
            json!({ "username": "autotest-2" }),
        )
        .await;
    assert_eq!(added.body["collaborators"], json!(["autotest-2"]));

    assert_eq!(
        api.get("/v1/apps/test-app", &collaborator).await.status,
        StatusCode::OK
    );
    assert_eq!(
        api.post(
            "/v1/apps/test-app/perms",
            &collaborator,
            json!({ "username": "autotest-3" }),
        )
        .await
        .status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        api.delete("/v1/apps/test-app", &collaborator).await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn collaborator_management_errors() {
    let api = TestApi::new();
    let owner = api.user("autotest", false).await;
    api.user("autotest-2", false).await;
    api.app(&owner, "test-app").await;

    let unknown = api
        .post("/v1/apps/test-app/perms", &owner, json!({ "username": "ghost" }))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let owner_again = api
        .post("/v1/apps/test-app/perms", &owner, json!({ "username": "autotest" }))
        .await;
    assert_eq!(owner_again.status, StatusCode::BAD_REQUEST);

    let not_member = api
        .delete("/v1/apps/test-app/perms/autotest-2", &owner)
        .await;
    assert_eq!(not_member.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn whoami_returns_the_token_holder() {
    let api = TestApi::new();
    let token = api.user("autotest", true).await;

    let me = api.get("/v1/auth/me", &token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "autotest");
    assert_eq!(me.body["is_admin"], true);
}

#[tokio::test]
async fn health_check_needs_no_token() {
    let api = TestApi::new();

    let health = api.call(Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "Healthy");
}
