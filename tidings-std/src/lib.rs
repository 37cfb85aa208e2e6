//! # tidings-std
//!
//! Standard implementations for the Tidings event dispatcher.
//!
//! This crate provides:
//! - **Listener store**: [`ListenerStore`], the exact/wildcard indexed registry
//! - **Execution**: [`Executor`], [`SequentialExecutor`], [`Instrumented`]
//! - **Plugins**: [`Plugin`], [`PluginManager`], [`LoggingPlugin`]
//! - **Testing**: recording and failing doubles in [`testing`]
//!
//! [`ListenerStore`]: store::ListenerStore
//! [`Executor`]: executor::Executor
//! [`SequentialExecutor`]: executor::SequentialExecutor
//! [`Instrumented`]: executor::Instrumented
//! [`Plugin`]: plugins::Plugin
//! [`PluginManager`]: plugins::PluginManager
//! [`LoggingPlugin`]: plugins::LoggingPlugin

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use tidings_core;

// Modules
pub mod executor;
pub mod plugins;
pub mod store;
pub mod testing;
