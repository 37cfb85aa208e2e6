//! Error types for Tidings.
//!
//! - [`BoxError`] - Type-erased error returned by handlers and plugins
//! - [`HandlerError`] - Why a single handler invocation failed
//!
//! Handler failures never escape an emission; they are isolated by the
//! executor and reported alongside the execution result.

use std::any::Any;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by a single handler invocation.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler returned an error, either directly or from its future.
    #[error("handler failed: {0}")]
    Failed(#[source] BoxError),

    /// The handler panicked, either during the call or while being polled.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Build a [`HandlerError::Panicked`] from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        HandlerError::Panicked(panic_message(payload.as_ref()))
    }

    /// Returns `true` if the failure was a panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked(_))
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Failed(err)
    }
}

/// Extract a readable message from a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
