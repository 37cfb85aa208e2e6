//! Emitter configuration.

use crate::emitter::Emitter;
use std::marker::PhantomData;
use tidings_core::Message;
use tidings_std::{
    executor::{Executor, Instrumented, SequentialExecutor},
    plugins::{Plugin, PluginManager},
};

/// How one-shot listeners are retired after an emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovalMode {
    /// One point removal per retired listener.
    #[default]
    Immediate,
    /// Mark every retired listener, then flush them in a single pass.
    Batched,
}

/// Builder for [`Emitter`].
///
/// # Example
/// ```ignore
/// let emitter = Emitter::<AppEvent>::builder()
///     .plugin(LoggingPlugin::named("app"))
///     .removal(RemovalMode::Batched)
///     .instrumented("app")
///     .build();
/// ```
pub struct EmitterBuilder<P: Message, X = SequentialExecutor> {
    executor: X,
    plugins: PluginManager,
    removal: RemovalMode,
    _payload: PhantomData<fn(P)>,
}

impl<P: Message> EmitterBuilder<P> {
    /// Defaults: sequential executor, no plugins, immediate removal.
    pub fn new() -> Self {
        Self {
            executor: SequentialExecutor::new(),
            plugins: PluginManager::new(),
            removal: RemovalMode::default(),
            _payload: PhantomData,
        }
    }
}

impl<P: Message> Default for EmitterBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, X> EmitterBuilder<P, X>
where
    P: Message,
    X: Executor<P>,
{
    /// Replace the executor.
    pub fn executor<Y: Executor<P>>(self, executor: Y) -> EmitterBuilder<P, Y> {
        EmitterBuilder {
            executor,
            plugins: self.plugins,
            removal: self.removal,
            _payload: PhantomData,
        }
    }

    /// Wrap the current executor in a `tracing` span per emission.
    pub fn instrumented(self, name: &'static str) -> EmitterBuilder<P, Instrumented<X>> {
        EmitterBuilder {
            executor: Instrumented::new(self.executor, name),
            plugins: self.plugins,
            removal: self.removal,
            _payload: PhantomData,
        }
    }

    /// Register a plugin. Plugins run in registration order.
    pub fn plugin<T: Plugin>(mut self, plugin: T) -> Self {
        self.plugins.register(plugin);
        self
    }

    /// Choose how one-shot listeners are retired.
    pub fn removal(mut self, mode: RemovalMode) -> Self {
        self.removal = mode;
        self
    }

    /// Build the emitter.
    pub fn build(self) -> Emitter<P, X> {
        Emitter::from_parts(self.executor, self.plugins, self.removal)
    }
}
