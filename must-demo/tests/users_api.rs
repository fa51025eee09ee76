//! User API through the recovery boundary, without a listener.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use must_core::{recover, HttpResponse, Recover};
use must_demo::{User, UserApi};
use serde_json::{json, Value};

fn api() -> Recover<UserApi> {
    recover(UserApi::seeded())
}

async fn send(api: &Recover<UserApi>, method: &str, uri: &str, body: &str) -> HttpResponse {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::from(body.to_owned()))
        .unwrap();
    api.handle(req).await
}

async fn body_json(response: HttpResponse) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn assert_error(response: HttpResponse, status: u16, message: &str) {
    assert_eq!(response.status().as_u16(), status);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(
        body_json(response).await,
        json!({ "error": { "message": message, "status": status } })
    );
}

#[tokio::test]
async fn get_existing_user() {
    let api = api();
    let response = send(&api, "GET", "/users?id=1", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let user: User = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(user, User::new(1, "John Doe", "john@example.com"));
}

#[tokio::test]
async fn get_failures_are_classified() {
    let api = api();
    assert_error(send(&api, "GET", "/users", "").await, 400, "Bad request").await;
    assert_error(send(&api, "GET", "/users?id=abc", "").await, 400, "Invalid user id").await;
    assert_error(send(&api, "GET", "/users?id=99", "").await, 404, "Resource not found").await;
}

#[tokio::test]
async fn create_validates_and_detects_conflicts() {
    let api = api();
    assert_error(send(&api, "POST", "/users", "{oops").await, 400, "Invalid JSON format").await;
    assert_error(
        send(&api, "POST", "/users", r#"{"email":"x@example.com"}"#).await,
        400,
        "Validation error",
    )
    .await;
    assert_error(
        send(&api, "POST", "/users", r#"{"name":"J","email":"john@example.com"}"#).await,
        409,
        "Resource conflict",
    )
    .await;

    let created = send(&api, "POST", "/users", r#"{"name":"Ann","email":"ann@example.com"}"#).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(body_json(created).await["id"], 3);
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let api = api();
    let updated = send(&api, "PUT", "/users?id=2", r#"{"name":"Jane","email":"jane@new.example"}"#).await;
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(api.get_ref().store().get(2).await.unwrap().name, "Jane");

    assert_error(
        send(&api, "PUT", "/users?id=42", r#"{"name":"X","email":"x@example.com"}"#).await,
        404,
        "Resource not found",
    )
    .await;

    let deleted = send(&api, "DELETE", "/users?id=2", "").await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    // Second delete aborts by unwinding; the boundary still answers 404.
    assert_error(send(&api, "DELETE", "/users?id=2", "").await, 404, "Resource not found").await;
}

#[tokio::test]
async fn routing_failures_and_panics() {
    let api = api();
    assert_error(send(&api, "PATCH", "/users", "").await, 405, "Method not allowed").await;
    assert_error(send(&api, "GET", "/orders", "").await, 404, "no route for /orders").await;
    assert_error(send(&api, "GET", "/panic", "").await, 500, "boom").await;

    let list = send(&api, "GET", "/users/all", "").await;
    assert_eq!(body_json(list).await.as_array().map(Vec::len), Some(2));
}
