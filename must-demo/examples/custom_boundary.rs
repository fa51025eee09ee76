//! Example: custom abort conversion. Aborts become `{"detail": ...}` bodies
//! instead of the default envelope; the interception itself is unchanged.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::Response;
use http_body_util::Full;
use must_core::{recover_with, Abort, HttpResponse, RequestHead, ServerConfig};
use must_demo::UserApi;
use serde_json::json;

fn detail_body(abort: Abort, head: &RequestHead) -> HttpResponse {
    let (status, message) = abort.resolve();
    let body = json!({ "detail": message, "path": head.uri.path() }).to_string();
    match Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
    {
        Ok(response) => response,
        Err(_) => must_core::plain_internal_error(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().init();
    let config = ServerConfig::from_env();
    println!("Listening on http://{}", config.addr());
    println!("  GET /users?id=1    GET /users?id=99  (404 as {{\"detail\": ...}})");
    must_core::run(recover_with(UserApi::seeded(), detail_body), &config)?;
    Ok(())
}
