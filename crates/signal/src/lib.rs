//! Typed publish/subscribe signals.
//!
//! A [`Signal`] is owned by the entity that emits it. Subscribers are
//! plain closures receiving `(sender, payload)`; delivery is synchronous
//! and in connection order. A failing subscriber is reported through the
//! thread's exception handler (see [`set_exception_handler`]) and never
//! stops delivery to the rest.

mod error;
mod signal;

pub use error::{reset_exception_handler, set_exception_handler, ExceptionHandler, SubscriberError};
pub use signal::{Connection, ConnectionId, EmitReport, Signal, SlotResult};
