#![allow(dead_code)]

use async_trait::async_trait;
use std::time::Duration;
use tidings::{
    BoxError, Handler, MaybeAsync, from_async,
    plugins::{EmitContext, Plugin},
    testing::OrderLog,
};

// ============================================================================
// Test Payloads
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct UserEvent {
    pub name: String,
}

impl UserEvent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

// ============================================================================
// Test Handlers
// ============================================================================

/// Appends `name` to the log after sleeping for `delay`.
pub fn slow_handler(log: &OrderLog, name: &'static str, delay: Duration) -> impl Handler<()> {
    let log = log.clone();
    from_async(move |_: ()| {
        let log = log.clone();
        async move {
            tokio::time::sleep(delay).await;
            log.push(name);
        }
    })
}

/// Panics synchronously on every call.
pub struct PanickingHandler;

impl<P: tidings::Message> Handler<P> for PanickingHandler {
    fn call<'a>(&'a self, _payload: &'a P) -> MaybeAsync<'a> {
        panic!("handler exploded")
    }
}

// ============================================================================
// Test Plugins
// ============================================================================

/// Panics before every emission and fails after it.
pub struct UnrulyPlugin;

#[async_trait]
impl Plugin for UnrulyPlugin {
    fn name(&self) -> &str {
        "unruly"
    }

    async fn before_emit(&self, _ctx: &EmitContext<'_>) -> Result<(), BoxError> {
        panic!("plugin exploded")
    }

    async fn after_emit(
        &self,
        _ctx: &EmitContext<'_>,
        _report: &tidings::executor::ExecutionReport,
    ) -> Result<(), BoxError> {
        Err("after_emit refused".into())
    }
}
