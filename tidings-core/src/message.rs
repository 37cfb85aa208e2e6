//! Message trait for event payloads.

/// A marker trait for payloads carried by emitted events.
///
/// Payloads must be `Send + Sync + 'static` so handlers can hold references to
/// them across await points on any runtime. Every such type is a `Message`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct UserLoggedIn { id: u64 }
///
/// let emitter = Emitter::<UserLoggedIn>::new();
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Event payloads in Tidings must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}
