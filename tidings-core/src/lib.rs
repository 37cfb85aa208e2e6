//! # tidings-core
//!
//! Core types for the Tidings in-process event dispatcher.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins and extensions that only need the vocabulary of the dispatcher,
//! not the store and executor implementations in `tidings-std`.
//!
//! # Contents
//!
//! ## Payloads ([`Message`])
//!
//! Any `Send + Sync + 'static` type can travel as an event payload.
//!
//! ## Handlers ([`Handler`], [`MaybeAsync`])
//!
//! The callable attached to a subscription. A call returns either a settled
//! result or a pending future; the executor awaits the latter before the next
//! handler starts.
//!
//! ## Listeners ([`Listener`], [`ListenerId`], [`ListenerOptions`])
//!
//! One registration: handler, pattern, priority, one-shot flag, statistics
//! and an opaque process-wide identity.
//!
//! ## Patterns ([`PatternMatcher`])
//!
//! Literal event names or wildcard patterns using `*`, compiled once and
//! cached.
//!
//! # Error Types
//!
//! - [`BoxError`] - Type-erased handler and plugin errors
//! - [`HandlerError`] - Why one handler invocation failed

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod handler;
mod listener;
mod message;
mod pattern;

// Re-exports
pub use error::{BoxError, HandlerError, panic_message};
pub use handler::{
    AsyncFn, Handler, HandlerResult, IntoHandlerResult, IntoMaybeAsync, MaybeAsync, from_async,
};
pub use listener::{Listener, ListenerId, ListenerOptions, ListenerStats, ListenerSummary};
pub use message::Message;
pub use pattern::{CompiledPattern, PatternMatcher, WILDCARD, has_wildcard};
