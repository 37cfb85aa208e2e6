//! # tidings - In-Process Event Emitter
//!
//! `tidings` is a publish/subscribe dispatcher for a single process. Handlers
//! subscribe to exact event names or `*` wildcard patterns, run in priority
//! order, may be synchronous or asynchronous, and can be one-shot.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tidings::prelude::*;
//!
//! #[derive(Clone)]
//! struct UserEvent { name: String }
//!
//! let emitter = Emitter::<UserEvent>::new();
//!
//! // Sync handler, high priority
//! emitter.on_with("user:login", |e: &UserEvent| println!("hi {}", e.name),
//!     ListenerOptions::new().with_priority(10));
//!
//! // Async handler for every user event
//! emitter.on("user:*", from_async(|e: UserEvent| async move {
//!     audit(e).await
//! }));
//!
//! emitter.emit("user:login", UserEvent { name: "ada".into() }).await;
//! ```
//!
//! ## Guarantees
//!
//! - Higher priority runs first; equal priorities run in subscription order.
//! - A handler's async work settles before the next handler starts.
//! - A failing or panicking handler never stops the others, and `emit`
//!   never fails.
//! - A one-shot listener is retired after its first successful execution.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod builder;
mod emitter;
mod subscription;

pub use builder::{EmitterBuilder, RemovalMode};
pub use emitter::Emitter;
pub use subscription::Subscription;

pub use tidings_core::{
    // Errors
    BoxError,
    HandlerError,
    // Handler
    Handler,
    HandlerResult,
    IntoHandlerResult,
    IntoMaybeAsync,
    // Listener
    ListenerId,
    ListenerOptions,
    ListenerSummary,
    MaybeAsync,
    // Message
    Message,
    // Pattern
    PatternMatcher,
    from_async,
};

/// Executors deciding how matched listeners run.
pub mod executor {
    pub use tidings_std::executor::{
        ExecutionReport, Executor, HandlerFailure, Instrumented, SequentialExecutor,
    };
}

/// Lifecycle plugins.
pub mod plugins {
    pub use tidings_std::plugins::{
        EmitContext, LoggingPlugin, Plugin, PluginError, PluginManager, Stage,
    };
}

/// The registry behind [`Emitter`], for custom façades.
pub mod store {
    pub use tidings_std::store::ListenerStore;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use tidings_std::testing::*;
}

/// Prelude module - common imports for tidings.
///
/// # Usage
///
/// ```rust,ignore
/// use tidings::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Emitter, Handler, ListenerId, ListenerOptions, MaybeAsync, Message,
        RemovalMode, Subscription, from_async,
        plugins::{LoggingPlugin, Plugin},
    };
}
