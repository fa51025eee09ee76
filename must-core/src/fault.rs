//! Fault: the structured (status, message) pair an abort carries to the boundary.

use http::StatusCode;
use thiserror::Error;

/// Why a request was aborted. Immutable once built; the boundary copies
/// `status` and `message` verbatim into the response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {}", .status.as_u16(), .message)]
pub struct Fault {
    status: StatusCode,
    message: String,
}

impl Fault {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_parts(self) -> (StatusCode, String) {
        (self.status, self.message)
    }
}
