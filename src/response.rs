//! Normalized response descriptors and the early-response signal.

use crate::error::{BoxError, InvokeError};
use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Normalized response descriptor consumed by the external dispatch layer.
///
/// A closed variant set: handlers and pipeline steps produce one of these,
/// never a transport-level response.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    NotFound,
    BadRequest(String),
    Conflict,
    Unauthorized,
    Redirect(String),
    /// Marker: render whatever template matches the endpoint, if any.
    RenderAny,
    /// Render the template matched for the current endpoint and format.
    RenderTemplate,
    /// Serialized data payload.
    Payload(Value),
    Status(StatusCode),
}

impl Outcome {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Outcome::BadRequest(msg.into())
    }

    pub fn redirect(url: impl Into<String>) -> Self {
        Outcome::Redirect(url.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::NotFound => StatusCode::NOT_FOUND,
            Outcome::BadRequest(_) => StatusCode::BAD_REQUEST,
            Outcome::Conflict => StatusCode::CONFLICT,
            Outcome::Unauthorized => StatusCode::UNAUTHORIZED,
            Outcome::Redirect(_) => StatusCode::FOUND,
            Outcome::RenderAny | Outcome::RenderTemplate | Outcome::Payload(_) => StatusCode::OK,
            Outcome::Status(s) => *s,
        }
    }
}

/// Raw value produced by a handler body, before normalization.
///
/// `Null` covers both a void method completing and a data-returning method
/// producing nothing; the descriptor's declared return kind disambiguates.
#[derive(Clone, Debug, PartialEq)]
pub enum ReturnValue {
    Null,
    Data(Value),
    Outcome(Outcome),
}

/// Raised by handler bodies and pipeline steps to short-circuit.
///
/// `Respond` carries an early response and is caught at the invocation
/// boundary; `Fail` is an unrecovered failure that propagates to the caller.
#[derive(Error, Debug)]
pub enum Signal {
    #[error("early response: {0:?}")]
    Respond(Outcome),
    #[error(transparent)]
    Fail(#[from] InvokeError),
}

impl Signal {
    /// Wrap an arbitrary handler failure as an unrecovered signal.
    pub fn fail(e: impl Into<BoxError>) -> Self {
        Signal::Fail(InvokeError::Handler(e.into()))
    }
}

impl From<Outcome> for Signal {
    fn from(outcome: Outcome) -> Self {
        Signal::Respond(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Outcome::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(Outcome::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Outcome::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(Outcome::redirect("/login").status(), StatusCode::FOUND);
        assert_eq!(Outcome::RenderTemplate.status(), StatusCode::OK);
        assert_eq!(
            Outcome::Status(StatusCode::ACCEPTED).status(),
            StatusCode::ACCEPTED
        );
    }

    #[test]
    fn test_outcome_into_signal() {
        let sig = Signal::from(Outcome::Conflict);
        assert!(matches!(sig, Signal::Respond(Outcome::Conflict)));
    }

    #[test]
    fn test_fail_wraps_any_error() {
        let sig = Signal::fail("boom");
        assert!(matches!(sig, Signal::Fail(InvokeError::Handler(_))));
    }
}
