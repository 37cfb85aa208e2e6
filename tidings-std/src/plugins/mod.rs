//! Plugins: optional middleware observing the dispatcher's lifecycle.
//!
//! Plugins are notified when listeners are added or removed and around every
//! emission. They cannot influence dispatch: their errors and panics are
//! caught by the [`PluginManager`] and reported back as [`PluginError`]s.

pub(crate) mod logging;
pub(crate) mod manager;
pub(crate) mod plugin;

pub use logging::LoggingPlugin;
pub use manager::PluginManager;
pub use plugin::{EmitContext, Plugin, PluginError, Stage};
