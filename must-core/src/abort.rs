//! Abort: the payload that travels from an abort site to the nearest recovery boundary.

use std::any::Any;
use std::sync::Once;

use http::StatusCode;
use thiserror::Error;

use crate::classify::FaultClass;
use crate::fault::Fault;

/// Generic error channel for unclassified aborts.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a step that may abort the current request.
pub type AbortResult<T> = Result<T, Abort>;

/// Message used when the payload carries nothing printable.
pub const FALLBACK_MESSAGE: &str = "Internal server error";

/// Everything an abort can carry. Consumed exactly once by a boundary.
#[derive(Error, Debug)]
pub enum Abort {
    #[error(transparent)]
    Fault(#[from] Fault),
    #[error("{0}")]
    Error(BoxError),
    #[error("{0}")]
    Message(String),
    #[error("opaque abort payload")]
    Unknown,
}

impl Abort {
    pub fn error(err: impl Into<BoxError>) -> Self {
        Self::from_boxed(err.into())
    }

    /// A boxed `Fault` (or `Abort`) keeps its own classification; anything
    /// else stays a generic error.
    pub fn from_boxed(err: BoxError) -> Self {
        let err = match err.downcast::<Abort>() {
            Ok(abort) => return *abort,
            Err(other) => other,
        };
        match err.downcast::<Fault>() {
            Ok(fault) => Self::Fault(*fault),
            Err(other) => Self::Error(other),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Unwind to the nearest boundary from code that cannot return a `Result`.
    /// The panic hook from [`install_panic_hook`] keeps this off stderr.
    pub fn raise(self) -> ! {
        install_panic_hook();
        std::panic::panic_any(self)
    }

    /// Map a `catch_unwind` payload onto the closed set of abort kinds.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Abort>() {
            Ok(abort) => return *abort,
            Err(other) => other,
        };
        let payload = match payload.downcast::<Fault>() {
            Ok(fault) => return Self::Fault(*fault),
            Err(other) => other,
        };
        let payload = match payload.downcast::<BoxError>() {
            Ok(err) => return Self::from_boxed(*err),
            Err(other) => other,
        };
        let payload = match payload.downcast::<String>() {
            Ok(message) => return Self::Message(*message),
            Err(other) => other,
        };
        match payload.downcast::<&'static str>() {
            Ok(message) => Self::Message((*message).to_owned()),
            Err(_) => Self::Unknown,
        }
    }

    /// Status and client message the default boundary answers with.
    pub fn resolve(&self) -> (StatusCode, String) {
        match self {
            Self::Fault(fault) => (fault.status(), fault.message().to_owned()),
            Self::Error(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Self::Message(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
            Self::Unknown => (StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_MESSAGE.to_owned()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fault(_) => "fault",
            Self::Error(_) => "error",
            Self::Message(_) => "message",
            Self::Unknown => "unknown",
        }
    }
}

static PANIC_HOOK: Once = Once::new();

/// Wrap the current panic hook so that unwinding with an [`Abort`] payload
/// prints nothing; every other panic still reaches the previous hook.
/// Idempotent.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if info.payload().is::<Abort>() {
                return;
            }
            previous(info);
        }));
    });
}

impl From<FaultClass> for Abort {
    fn from(class: FaultClass) -> Self {
        Self::Fault(class.fault())
    }
}
