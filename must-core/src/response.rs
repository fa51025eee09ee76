//! Error response encoding: the JSON wire shape and the plaintext fallback.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::abort::FALLBACK_MESSAGE;

pub type HttpResponse = Response<Full<Bytes>>;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to serialize error body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to build error response: {0}")]
    Http(#[from] http::Error),
}

/// `{"error": {"message": ..., "status": ...}}`
#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
    status: u16,
}

pub fn try_json_error(status: StatusCode, message: &str) -> Result<HttpResponse, EncodeError> {
    let body = serde_json::to_vec(&ErrorEnvelope {
        error: ErrorDetail {
            message,
            status: status.as_u16(),
        },
    })?;
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))?;
    Ok(response)
}

/// JSON error response; degrades to [`plain_internal_error`] if encoding fails.
pub fn json_error(status: StatusCode, message: &str) -> HttpResponse {
    or_plain_fallback(try_json_error(status, message))
}

fn or_plain_fallback(encoded: Result<HttpResponse, EncodeError>) -> HttpResponse {
    match encoded {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "failed to encode error response");
            plain_internal_error()
        }
    }
}

/// Minimal plaintext 500. Built without fallible steps.
pub fn plain_internal_error() -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(format!("{FALLBACK_MESSAGE}\n"))));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}
