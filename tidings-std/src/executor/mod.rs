//! Handler execution.
//!
//! An [`Executor`] receives the ordered snapshot produced by the listener
//! store and runs it to completion. It never touches the store: one-shot
//! listeners that must be retired are returned in the [`ExecutionReport`].

pub(crate) mod instrumented;
pub(crate) mod sequential;
pub(crate) mod traits;

pub use instrumented::Instrumented;
pub use sequential::SequentialExecutor;
pub use traits::{ExecutionReport, Executor, HandlerFailure};
