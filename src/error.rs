//! Typed errors: construction-time failures and unrecovered request-time failures.

use thiserror::Error;

/// Boxed error used at collaborator boundaries (bean loading, handler bodies).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures while building an invoker at application startup.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("unknown controller class: {0}")]
    UnknownClass(String),
    #[error("no method {method} on controller {class} matching declared parameter types")]
    UnknownMethod { class: String, method: String },
    #[error("invalid response status {status} on {handler}")]
    InvalidStatus { handler: String, status: u16 },
    #[error("blank exception class on {0}")]
    BlankExceptionClass(String),
}

/// Request-time failures the pipeline does not convert into an outcome.
/// The external dispatch layer decides final handling (typically a 500).
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("loading controller {class}: {source}")]
    BeanLoad { class: String, source: BoxError },
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}
