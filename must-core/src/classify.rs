//! Fault classes and the substring table used when a caller asks for an
//! inferred classification.

use http::StatusCode;

use crate::abort::{Abort, BoxError};
use crate::fault::Fault;

/// Named fault classes with a fixed status and canonical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultClass {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Timeout,
    Conflict,
    UnprocessableEntity,
    /// 400 with a message distinct from `BadRequest`.
    Validation,
    TooManyRequests,
    Internal,
    ServiceUnavailable,
}

impl FaultClass {
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest | Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Conflict => StatusCode::CONFLICT,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::Validation => "Validation error",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Resource not found",
            Self::Timeout => "Request timeout",
            Self::Conflict => "Resource conflict",
            Self::UnprocessableEntity => "Unprocessable entity",
            Self::TooManyRequests => "Too many requests",
            Self::Internal => "Internal server error",
            Self::ServiceUnavailable => "Service unavailable",
        }
    }

    pub fn fault(self) -> Fault {
        Fault::new(self.status(), self.message())
    }
}

impl From<FaultClass> for Fault {
    fn from(class: FaultClass) -> Self {
        class.fault()
    }
}

struct Rule {
    pattern: &'static str,
    class: FaultClass,
}

/// Inference rules. Matching is case-sensitive and the first hit wins, so a
/// message mentioning both "not found" and "conflict" is a 404.
const RULES: [Rule; 7] = [
    Rule { pattern: "not found", class: FaultClass::NotFound },
    Rule { pattern: "unauthorized", class: FaultClass::Unauthorized },
    Rule { pattern: "forbidden", class: FaultClass::Forbidden },
    Rule { pattern: "bad request", class: FaultClass::BadRequest },
    Rule { pattern: "validation", class: FaultClass::Validation },
    Rule { pattern: "timeout", class: FaultClass::Timeout },
    Rule { pattern: "conflict", class: FaultClass::Conflict },
];

/// First rule whose pattern occurs anywhere in `text`.
pub fn infer_class(text: &str) -> Option<FaultClass> {
    RULES
        .iter()
        .find(|rule| text.contains(rule.pattern))
        .map(|rule| rule.class)
}

/// Inferred fault for an error text; unmatched text is a 500.
pub fn classify(text: &str) -> Fault {
    infer_class(text).unwrap_or(FaultClass::Internal).fault()
}

/// How an error becomes an abort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Carry the error itself; the boundary answers 500 with its text.
    Unclassified,
    /// Like `Unclassified`, with the error text prefixed as `"<message>: <error>"`.
    WithMessage(String),
    Explicit(Fault),
    Class(FaultClass),
    /// Pick a class from the error text via the rule table.
    Inferred,
}

impl Classification {
    pub fn abort(self, err: BoxError) -> Abort {
        match self {
            Self::Unclassified => Abort::from_boxed(err),
            Self::WithMessage(message) => Abort::Error(Box::new(WithMessage {
                message,
                source: err,
            })),
            Self::Explicit(fault) => Abort::Fault(fault),
            Self::Class(class) => Abort::Fault(class.fault()),
            Self::Inferred => Abort::Fault(classify(&err.to_string())),
        }
    }
}

impl From<FaultClass> for Classification {
    fn from(class: FaultClass) -> Self {
        Self::Class(class)
    }
}

impl From<Fault> for Classification {
    fn from(fault: Fault) -> Self {
        Self::Explicit(fault)
    }
}

/// Error wrapped with a caller-supplied context message.
#[derive(thiserror::Error, Debug)]
#[error("{message}: {source}")]
pub struct WithMessage {
    message: String,
    source: BoxError,
}
