//! Abort primitives: turn a fallible result into either its value or an abort.
//!
//! Every primitive is a no-op on success and hands the value back, so they
//! work in expression position: `let id: u64 = raw.parse().must_bad_request()?;`.

use http::StatusCode;

use crate::abort::{Abort, BoxError};
use crate::classify::{Classification, FaultClass};
use crate::fault::Fault;

/// Abort primitives over `Result<T, E>`.
pub trait Must<T>: Sized {
    /// Keep the value, or abort with the error classified as requested.
    fn must_classify(self, classification: impl Into<Classification>) -> Result<T, Abort>;

    /// Abort with the error itself; the boundary answers 500 with its text.
    fn must(self) -> Result<T, Abort> {
        self.must_classify(Classification::Unclassified)
    }

    fn must_with_message(self, message: impl Into<String>) -> Result<T, Abort> {
        self.must_classify(Classification::WithMessage(message.into()))
    }

    fn must_http(self, status: StatusCode, message: impl Into<String>) -> Result<T, Abort> {
        self.must_classify(Fault::new(status, message))
    }

    fn must_as(self, class: FaultClass) -> Result<T, Abort> {
        self.must_classify(class)
    }

    /// Classify from the error text using the inference table.
    fn must_infer(self) -> Result<T, Abort> {
        self.must_classify(Classification::Inferred)
    }

    fn must_bad_request(self) -> Result<T, Abort> {
        self.must_as(FaultClass::BadRequest)
    }

    fn must_unauthorized(self) -> Result<T, Abort> {
        self.must_as(FaultClass::Unauthorized)
    }

    fn must_forbidden(self) -> Result<T, Abort> {
        self.must_as(FaultClass::Forbidden)
    }

    fn must_not_found(self) -> Result<T, Abort> {
        self.must_as(FaultClass::NotFound)
    }

    fn must_timeout(self) -> Result<T, Abort> {
        self.must_as(FaultClass::Timeout)
    }

    fn must_conflict(self) -> Result<T, Abort> {
        self.must_as(FaultClass::Conflict)
    }

    fn must_unprocessable(self) -> Result<T, Abort> {
        self.must_as(FaultClass::UnprocessableEntity)
    }

    fn must_validation(self) -> Result<T, Abort> {
        self.must_as(FaultClass::Validation)
    }

    fn must_too_many_requests(self) -> Result<T, Abort> {
        self.must_as(FaultClass::TooManyRequests)
    }

    fn must_internal(self) -> Result<T, Abort> {
        self.must_as(FaultClass::Internal)
    }

    fn must_unavailable(self) -> Result<T, Abort> {
        self.must_as(FaultClass::ServiceUnavailable)
    }

    /// Unwinding form: returns the value or raises the abort via panic.
    /// Only sound inside a recovery boundary.
    fn or_raise(self, classification: impl Into<Classification>) -> T {
        match self.must_classify(classification) {
            Ok(value) => value,
            Err(abort) => abort.raise(),
        }
    }
}

impl<T, E> Must<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn must_classify(self, classification: impl Into<Classification>) -> Result<T, Abort> {
        self.map_err(|err| classification.into().abort(err.into()))
    }
}

/// Abort when `err` is present.
pub fn abort_if<E>(err: Option<E>, classification: impl Into<Classification>) -> Result<(), Abort>
where
    E: Into<BoxError>,
{
    match err {
        Some(err) => Err(classification.into().abort(err.into())),
        None => Ok(()),
    }
}

/// Abort with the error itself when present.
pub fn abort_if_error<E: Into<BoxError>>(err: Option<E>) -> Result<(), Abort> {
    abort_if(err, Classification::Unclassified)
}

/// Abort with an inferred classification when present.
pub fn abort_if_error_inferred<E: Into<BoxError>>(err: Option<E>) -> Result<(), Abort> {
    abort_if(err, Classification::Inferred)
}

/// `(value, error)` pair form: the value comes back untouched when `err` is absent.
pub fn must_parse<T, E>(
    value: T,
    err: Option<E>,
    classification: impl Into<Classification>,
) -> Result<T, Abort>
where
    E: Into<BoxError>,
{
    abort_if(err, classification).map(|()| value)
}
