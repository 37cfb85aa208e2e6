//! # Handlers
//!
//! A handler is the user code attached to a subscription. It receives a
//! reference to the emitted payload and finishes either immediately or later.
//!
//! Handlers never declare up front whether they are synchronous. Instead each
//! call returns a [`MaybeAsync`]:
//!
//! - [`MaybeAsync::Ready`]: the work is already done (with its result)
//! - [`MaybeAsync::Pending`]: a boxed future that must be awaited before the
//!   next handler of the same emission may start
//!
//! # Usage Patterns
//!
//! 1. **Plain closure**: `|payload: &MyEvent| println!("{payload:?}")`
//! 2. **Fallible closure**: `|payload: &MyEvent| -> Result<(), BoxError> { ... }`
//! 3. **Async closure**: [`from_async`]`(|payload: MyEvent| async move { ... })`
//! 4. **Struct implementation**: `impl Handler<MyEvent> for MyHandler`, which
//!    may borrow the payload inside the returned future.

use crate::{error::BoxError, message::Message};
use futures::future::BoxFuture;
use std::{fmt, future::Future};

/// The settled result of one handler invocation.
pub type HandlerResult = Result<(), BoxError>;

/// The outcome of calling a handler: finished, or still running.
pub enum MaybeAsync<'a> {
    /// The handler finished during the call.
    Ready(HandlerResult),
    /// The handler returned work that completes later.
    Pending(BoxFuture<'a, HandlerResult>),
}

impl<'a> MaybeAsync<'a> {
    /// A successfully completed synchronous call.
    pub fn done() -> Self {
        MaybeAsync::Ready(Ok(()))
    }

    /// Wrap a future; its output is converted with [`IntoHandlerResult`].
    pub fn pending<F, R>(future: F) -> Self
    where
        F: Future<Output = R> + Send + 'a,
        R: IntoHandlerResult,
    {
        MaybeAsync::Pending(Box::pin(async move { future.await.into_handler_result() }))
    }

    /// Returns `true` if the caller must await the result.
    pub fn is_pending(&self) -> bool {
        matches!(self, MaybeAsync::Pending(_))
    }

    /// Drive the outcome to completion.
    pub async fn settle(self) -> HandlerResult {
        match self {
            MaybeAsync::Ready(result) => result,
            MaybeAsync::Pending(future) => future.await,
        }
    }
}

impl fmt::Debug for MaybeAsync<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaybeAsync::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            MaybeAsync::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Conversion of a handler's natural return value into a [`HandlerResult`].
pub trait IntoHandlerResult {
    /// Perform the conversion.
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoHandlerResult for Result<(), E> {
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// Conversion of a handler's return value into a [`MaybeAsync`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a handler",
    label = "handlers return `()`, `Result<(), E>` or `MaybeAsync`",
    note = "Wrap futures with `MaybeAsync::pending` or register the closure with `from_async`."
)]
pub trait IntoMaybeAsync<'a> {
    /// Perform the conversion.
    fn into_maybe_async(self) -> MaybeAsync<'a>;
}

impl<'a> IntoMaybeAsync<'a> for () {
    fn into_maybe_async(self) -> MaybeAsync<'a> {
        MaybeAsync::done()
    }
}

impl<'a, E: Into<BoxError>> IntoMaybeAsync<'a> for Result<(), E> {
    fn into_maybe_async(self) -> MaybeAsync<'a> {
        MaybeAsync::Ready(self.into_handler_result())
    }
}

impl<'a, 'b: 'a> IntoMaybeAsync<'a> for MaybeAsync<'b> {
    fn into_maybe_async(self) -> MaybeAsync<'a> {
        self
    }
}

/// The callable attached to a subscription.
///
/// Object-safe: the store keeps handlers as `Arc<dyn Handler<P>>`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle payloads of type `{P}`",
    label = "missing `Handler<{P}>` implementation",
    note = "Closures must take `&{P}`; async closures taking an owned payload go through `from_async`."
)]
pub trait Handler<P: Message>: Send + Sync + 'static {
    /// Invoke the handler with the emitted payload.
    fn call<'a>(&'a self, payload: &'a P) -> MaybeAsync<'a>;
}

impl<P, F, R> Handler<P> for F
where
    P: Message,
    F: Fn(&P) -> R + Send + Sync + 'static,
    R: for<'a> IntoMaybeAsync<'a>,
{
    fn call<'a>(&'a self, payload: &'a P) -> MaybeAsync<'a> {
        (self)(payload).into_maybe_async()
    }
}

/// Handler adapter for async closures that take an owned payload.
///
/// Created by [`from_async`].
pub struct AsyncFn<F> {
    f: F,
}

/// Adapt an async closure into a [`Handler`].
///
/// The closure receives a clone of the payload so the returned future does not
/// borrow from the emission.
///
/// ```rust,ignore
/// emitter.on("user:*", from_async(|event: UserEvent| async move {
///     audit_log.write(event).await
/// }));
/// ```
pub fn from_async<F>(f: F) -> AsyncFn<F> {
    AsyncFn { f }
}

impl<P, F, Fut, R> Handler<P> for AsyncFn<F>
where
    P: Message + Clone,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoHandlerResult,
{
    fn call<'a>(&'a self, payload: &'a P) -> MaybeAsync<'a> {
        MaybeAsync::pending((self.f)(payload.clone()))
    }
}
