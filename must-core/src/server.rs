//! HTTP server: tokio + hyper. Every request runs inside a recovery boundary.
//! One task per connection; an abort never leaves the request that raised it.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use http_body_util::{BodyExt, Limited};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::classify::FaultClass;
use crate::abort::install_panic_hook;
use crate::config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
use crate::recover::{AbortHandler, Handler, Recover, RequestHead};
use crate::response::HttpResponse;
use crate::Abort;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("failed to build runtime: {0}")]
    Runtime(std::io::Error),
}

/// Serve `boundary` until ctrl-c. Blocks on a fresh multi-thread runtime.
pub fn run<H, A>(boundary: Recover<H, A>, config: &ServerConfig) -> Result<(), ServeError>
where
    H: Handler + 'static,
    A: AbortHandler + 'static,
{
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServeError::Runtime)?;
    rt.block_on(serve(boundary, config))
}

/// Bind `config.addr()` and serve `boundary` until ctrl-c.
pub async fn serve<H, A>(boundary: Recover<H, A>, config: &ServerConfig) -> Result<(), ServeError>
where
    H: Handler + 'static,
    A: AbortHandler + 'static,
{
    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind { addr: addr.clone(), source })?;
    info!(%addr, "listening");
    serve_listener(listener, boundary, config.max_body_bytes, ctrl_c()).await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler unavailable, serving until the process exits");
        std::future::pending::<()>().await;
    }
}

/// Accept loop on an already bound listener; returns once `shutdown` resolves.
pub async fn serve_with_shutdown<H, A, S>(
    listener: TcpListener,
    boundary: Recover<H, A>,
    shutdown: S,
) -> Result<(), ServeError>
where
    H: Handler + 'static,
    A: AbortHandler + 'static,
    S: Future<Output = ()>,
{
    serve_listener(listener, boundary, DEFAULT_MAX_BODY_BYTES, shutdown).await
}

/// Like [`serve_with_shutdown`], rejecting bodies larger than `max_body_bytes`.
pub async fn serve_listener<H, A, S>(
    listener: TcpListener,
    boundary: Recover<H, A>,
    max_body_bytes: usize,
    shutdown: S,
) -> Result<(), ServeError>
where
    H: Handler + 'static,
    A: AbortHandler + 'static,
    S: Future<Output = ()>,
{
    install_panic_hook();
    let boundary = Arc::new(boundary);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                break Ok(());
            }
            accept_result = listener.accept() => {
                let (stream, peer) = match accept_result {
                    Ok(x) => x,
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let boundary = Arc::clone(&boundary);
                tokio::task::spawn(async move {
                    let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                        let boundary = Arc::clone(&boundary);
                        async move {
                            Ok::<_, Infallible>(dispatch(&boundary, req, max_body_bytes).await)
                        }
                    });
                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        debug!(%peer, error = %e, "serve_connection error");
                    }
                });
            }
        }
    }
}

async fn dispatch<H, A>(
    boundary: &Recover<H, A>,
    req: hyper::Request<hyper::body::Incoming>,
    max_body_bytes: usize,
) -> HttpResponse
where
    H: Handler,
    A: AbortHandler,
{
    let head = RequestHead::of(&req);
    let (parts, body) = req.into_parts();
    match Limited::new(body, max_body_bytes).collect().await {
        Ok(collected) => {
            boundary
                .handle(hyper::Request::from_parts(parts, collected.to_bytes()))
                .await
        }
        Err(e) => {
            debug!(error = %e, limit = max_body_bytes, "failed to read request body");
            boundary.intercept(Abort::from(FaultClass::BadRequest), &head)
        }
    }
}
