//! Recovery boundary: wraps a request handler, intercepts every abort raised
//! inside it and turns it into a complete HTTP response.
//!
//! Aborts arrive two ways: as the `Err` of the handler's result, or as an
//! unwinding panic (from [`Abort::raise`], [`Must::or_raise`](crate::Must::or_raise)
//! or any plain `panic!`). Both go through the same conversion.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::FutureExt;
use http::{Method, Request, Uri};
use tracing::{error, warn};

use crate::abort::Abort;
use crate::response::{json_error, plain_internal_error, HttpResponse};

pub type HttpRequest = Request<Bytes>;

/// One unit of request processing.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: HttpRequest) -> Result<HttpResponse, Abort>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Abort>> + Send + 'static,
{
    async fn call(&self, req: HttpRequest) -> Result<HttpResponse, Abort> {
        self(req).await
    }
}

/// What the boundary still knows about the request once the handler consumed it.
#[derive(Clone, Debug)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
}

impl RequestHead {
    pub fn of<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
        }
    }
}

/// Converts an intercepted abort into the response sent to the client.
pub trait AbortHandler: Send + Sync {
    fn handle(&self, abort: Abort, head: &RequestHead) -> HttpResponse;
}

impl<F> AbortHandler for F
where
    F: Fn(Abort, &RequestHead) -> HttpResponse + Send + Sync,
{
    fn handle(&self, abort: Abort, head: &RequestHead) -> HttpResponse {
        self(abort, head)
    }
}

/// Default conversion: `{"error":{"message":M,"status":S}}` with status S.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonAbortHandler;

impl AbortHandler for JsonAbortHandler {
    fn handle(&self, abort: Abort, _head: &RequestHead) -> HttpResponse {
        let (status, message) = abort.resolve();
        json_error(status, &message)
    }
}

/// Answers every abort with a plaintext 500, ignoring its payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainAbortHandler;

impl AbortHandler for PlainAbortHandler {
    fn handle(&self, _abort: Abort, _head: &RequestHead) -> HttpResponse {
        plain_internal_error()
    }
}

/// Recovery boundary around `H`. Itself a [`Handler`] that never returns `Err`,
/// so wrapping twice behaves like wrapping once.
pub struct Recover<H, A = JsonAbortHandler> {
    inner: H,
    on_abort: A,
}

impl<H: Handler> Recover<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            on_abort: JsonAbortHandler,
        }
    }
}

impl<H: Handler> Recover<H, PlainAbortHandler> {
    pub fn plain(inner: H) -> Self {
        Self {
            inner,
            on_abort: PlainAbortHandler,
        }
    }
}

impl<H: Handler, A: AbortHandler> Recover<H, A> {
    /// Boundary with a caller-supplied conversion in place of the JSON body.
    pub fn with_handler(inner: H, on_abort: A) -> Self {
        Self { inner, on_abort }
    }

    pub fn get_ref(&self) -> &H {
        &self.inner
    }

    /// Run the wrapped handler; any abort becomes a response.
    pub async fn handle(&self, req: HttpRequest) -> HttpResponse {
        let head = RequestHead::of(&req);
        let outcome = AssertUnwindSafe(self.inner.call(req)).catch_unwind().await;
        let abort = match outcome {
            Ok(Ok(response)) => return response,
            Ok(Err(abort)) => abort,
            Err(payload) => Abort::from_panic(payload),
        };
        self.intercept(abort, &head)
    }

    /// Log the abort and convert it. Used for aborts raised outside the
    /// handler call, e.g. while reading the request body.
    pub fn intercept(&self, abort: Abort, head: &RequestHead) -> HttpResponse {
        let (status, _) = abort.resolve();
        if status.is_server_error() {
            error!(
                method = %head.method,
                path = head.uri.path(),
                kind = abort.kind(),
                status = status.as_u16(),
                "request aborted: {abort}"
            );
        } else {
            warn!(
                method = %head.method,
                path = head.uri.path(),
                kind = abort.kind(),
                status = status.as_u16(),
                "request aborted: {abort}"
            );
        }
        self.on_abort.handle(abort, head)
    }
}

#[async_trait]
impl<H: Handler, A: AbortHandler> Handler for Recover<H, A> {
    async fn call(&self, req: HttpRequest) -> Result<HttpResponse, Abort> {
        Ok(self.handle(req).await)
    }
}

/// Wrap `handler` in the default JSON recovery boundary.
pub fn recover<H: Handler>(handler: H) -> Recover<H> {
    Recover::new(handler)
}

/// Wrap `handler` in a boundary that hands aborts to `on_abort`.
pub fn recover_with<H: Handler, A: AbortHandler>(handler: H, on_abort: A) -> Recover<H, A> {
    Recover::with_handler(handler, on_abort)
}
