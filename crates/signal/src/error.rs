//! Subscriber failures and the per-thread channel they are reported on.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::ConnectionId;

/// A subscriber returned an error while a signal was being emitted.
#[derive(Error, Debug)]
#[error("subscriber {connection} of signal `{signal}` failed: {source}")]
pub struct SubscriberError {
    /// Payload type name of the emitting signal
    pub signal: &'static str,
    /// Connection that failed
    pub connection: ConnectionId,
    /// Error returned by the subscriber
    #[source]
    pub source: anyhow::Error,
}

/// Callback receiving every subscriber failure on the current thread.
pub type ExceptionHandler = Rc<dyn Fn(&SubscriberError)>;

thread_local! {
    static EXCEPTION_HANDLER: RefCell<Option<ExceptionHandler>> = const { RefCell::new(None) };
}

/// Install a handler for subscriber failures on this thread.
///
/// Returns the previously installed handler, if any. Without a handler,
/// failures are logged at error level.
pub fn set_exception_handler(
    handler: impl Fn(&SubscriberError) + 'static,
) -> Option<ExceptionHandler> {
    EXCEPTION_HANDLER.with(|slot| slot.borrow_mut().replace(Rc::new(handler)))
}

/// Restore the default (logging) handler.
pub fn reset_exception_handler() -> Option<ExceptionHandler> {
    EXCEPTION_HANDLER.with(|slot| slot.borrow_mut().take())
}

pub(crate) fn report(error: SubscriberError) {
    // Clone out of the cell so the handler may replace itself.
    let handler = EXCEPTION_HANDLER.with(|slot| slot.borrow().clone());
    match handler {
        Some(handler) => handler(&error),
        None => cmdpanel_logger::error(error.to_string()),
    }
}
