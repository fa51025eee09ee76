//! User CRUD handlers. Every failure path is a single abort primitive; the
//! recovery boundary around [`UserApi`] turns it into the error response.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Response, StatusCode, Uri};
use http_body_util::Full;
use must_core::{
    abort_if, Abort, AbortResult, Classification, Fault, FaultClass, Handler, HttpRequest,
    HttpResponse, Must,
};
use serde::Serialize;
use tracing::debug;

use crate::store::{User, UserStore};

/// Routes `/users` (GET, POST, PUT, DELETE with `?id=N`), `/users/all` and `/panic`.
#[derive(Clone, Debug)]
pub struct UserApi {
    store: Arc<UserStore>,
}

impl UserApi {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }

    pub fn seeded() -> Self {
        Self::new(Arc::new(UserStore::seeded()))
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    async fn get_user(&self, req: &HttpRequest) -> AbortResult<HttpResponse> {
        let id = user_id(req.uri())?;
        let user = self.store.get(id).await.must_infer()?;
        json(StatusCode::OK, &user)
    }

    async fn list_users(&self) -> AbortResult<HttpResponse> {
        json(StatusCode::OK, &self.store.list().await)
    }

    async fn create_user(&self, req: &HttpRequest) -> AbortResult<HttpResponse> {
        let user = parse_user(req.body())?;
        let created = self.store.create(user).await.must_conflict()?;
        json(StatusCode::CREATED, &created)
    }

    async fn update_user(&self, req: &HttpRequest) -> AbortResult<HttpResponse> {
        let id = user_id(req.uri())?;
        self.store.get(id).await.must_not_found()?;
        let user = parse_user(req.body())?;
        let updated = self.store.update(id, user).await.must_conflict()?;
        json(StatusCode::OK, &updated)
    }

    async fn delete_user(&self, req: &HttpRequest) -> AbortResult<HttpResponse> {
        let id = user_id(req.uri())?;
        // Unwinding form: nothing between here and the boundary inspects it.
        let removed = self.store.delete(id).await.or_raise(FaultClass::NotFound);
        debug!(id = removed.id, "user deleted");
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NO_CONTENT;
        Ok(response)
    }
}

#[async_trait]
impl Handler for UserApi {
    async fn call(&self, req: HttpRequest) -> AbortResult<HttpResponse> {
        match (req.method(), req.uri().path()) {
            (&Method::GET, "/users") => self.get_user(&req).await,
            (&Method::POST, "/users") => self.create_user(&req).await,
            (&Method::PUT, "/users") => self.update_user(&req).await,
            (&Method::DELETE, "/users") => self.delete_user(&req).await,
            (&Method::GET, "/users/all") => self.list_users().await,
            (_, "/panic") => panic!("boom"),
            (_, "/users" | "/users/all") => Err(Fault::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
            )
            .into()),
            (_, path) => Err(Fault::new(StatusCode::NOT_FOUND, format!("no route for {path}")).into()),
        }
    }
}

fn query_param<'a>(uri: &'a Uri, key: &str) -> Option<&'a str> {
    uri.query()?
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

fn user_id(uri: &Uri) -> AbortResult<u64> {
    let raw = query_param(uri, "id")
        .ok_or("user id is required")
        .must_bad_request()?;
    raw.parse::<u64>()
        .must_http(StatusCode::BAD_REQUEST, "Invalid user id")
}

fn parse_user(body: &[u8]) -> AbortResult<User> {
    let user: User =
        serde_json::from_slice(body).must_http(StatusCode::BAD_REQUEST, "Invalid JSON format")?;
    abort_if(user.name.is_empty().then_some("name is required"), FaultClass::Validation)?;
    abort_if(user.email.is_empty().then_some("email is required"), FaultClass::Validation)?;
    Ok(user)
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> AbortResult<HttpResponse> {
    let body = serde_json::to_vec(value)
        .must_classify(Classification::WithMessage("failed to encode response".into()))?;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .map_err(Abort::error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_finds_key() {
        let uri: Uri = "/users?x=1&id=42".parse().unwrap();
        assert_eq!(query_param(&uri, "id"), Some("42"));
        let uri: Uri = "/users?id=".parse().unwrap();
        assert_eq!(query_param(&uri, "id"), None);
        let uri: Uri = "/users".parse().unwrap();
        assert_eq!(query_param(&uri, "id"), None);
    }

    #[test]
    fn user_id_classifies_failures() {
        let missing = user_id(&"/users".parse().unwrap()).unwrap_err();
        assert_eq!(missing.resolve(), (StatusCode::BAD_REQUEST, "Bad request".to_owned()));
        let bad = user_id(&"/users?id=abc".parse().unwrap()).unwrap_err();
        assert_eq!(bad.resolve(), (StatusCode::BAD_REQUEST, "Invalid user id".to_owned()));
        assert_eq!(user_id(&"/users?id=7".parse().unwrap()).unwrap(), 7);
    }

    #[test]
    fn parse_user_requires_name_and_email() {
        let err = parse_user(br#"{"email":"a@b.c"}"#).unwrap_err();
        assert_eq!(err.resolve(), (StatusCode::BAD_REQUEST, "Validation error".to_owned()));
        let err = parse_user(b"{not json").unwrap_err();
        assert_eq!(err.resolve(), (StatusCode::BAD_REQUEST, "Invalid JSON format".to_owned()));
    }
}
