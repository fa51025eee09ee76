//! must-core: abort primitives, fault classification and a recovery boundary
//! for hyper request handlers.
//!
//! Handler code calls a primitive inline (`raw.parse::<u64>().must_bad_request()?`);
//! on failure the abort propagates straight to the enclosing [`Recover`]
//! boundary, which answers with `{"error":{"message":M,"status":S}}`.

pub mod abort;
pub mod classify;
pub mod config;
pub mod fault;
pub mod must;
pub mod recover;
pub mod response;
pub mod server;

pub use abort::{install_panic_hook, Abort, AbortResult, BoxError, FALLBACK_MESSAGE};
pub use classify::{classify, infer_class, Classification, FaultClass};
pub use config::ServerConfig;
pub use fault::Fault;
pub use must::{abort_if, abort_if_error, abort_if_error_inferred, must_parse, Must};
pub use recover::{
    recover, recover_with, AbortHandler, Handler, HttpRequest, JsonAbortHandler,
    PlainAbortHandler, Recover, RequestHead,
};
pub use response::{json_error, plain_internal_error, HttpResponse};
pub use server::{run, serve, serve_listener, serve_with_shutdown, ServeError};
