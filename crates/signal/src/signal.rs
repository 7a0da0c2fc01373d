//! Signal implementation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{report, SubscriberError};

/// Result returned by a subscriber.
pub type SlotResult = anyhow::Result<()>;

type Slot<S, T> = Rc<dyn Fn(&S, &T) -> SlotResult>;

/// Identifier of one connection, unique within its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Build an id from its raw value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one [`Signal::emit`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Subscribers that ran
    pub delivered: usize,
    /// Subscribers that returned an error (already reported)
    pub failed: usize,
}

struct Subscriber<S, T> {
    id: ConnectionId,
    slot: Slot<S, T>,
}

impl<S, T> Clone for Subscriber<S, T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            slot: Rc::clone(&self.slot),
        }
    }
}

struct SlotList<S, T> {
    subscribers: RefCell<Vec<Subscriber<S, T>>>,
    next_id: Cell<u64>,
}

impl<S, T> SlotList<S, T> {
    fn contains(&self, id: ConnectionId) -> bool {
        self.subscribers.borrow().iter().any(|s| s.id == id)
    }
}

/// Type-erased view of a subscriber list, so a [`Connection`] does not
/// carry the signal's type parameters.
trait Detach {
    fn detach(&self, id: ConnectionId) -> bool;
    fn is_attached(&self, id: ConnectionId) -> bool;
}

impl<S, T> Detach for SlotList<S, T> {
    fn detach(&self, id: ConnectionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    fn is_attached(&self, id: ConnectionId) -> bool {
        self.contains(id)
    }
}

/// Token returned by [`Signal::connect`].
///
/// Holds only a weak reference to the signal: once the owning entity (and
/// with it the signal) is dropped, the token is inert.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    list: Weak<dyn Detach>,
}

impl Connection {
    /// Identifier of this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remove the subscriber. Returns false if it was already removed or
    /// the signal no longer exists.
    pub fn disconnect(&self) -> bool {
        self.list
            .upgrade()
            .map(|list| list.detach(self.id))
            .unwrap_or(false)
    }

    /// Whether the subscriber is still registered.
    pub fn is_connected(&self) -> bool {
        self.list
            .upgrade()
            .map(|list| list.is_attached(self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Publish/subscribe channel owned by a sender of type `S`, carrying
/// payloads of type `T`.
///
/// All methods take `&self`, so subscribers may connect, disconnect or
/// emit again while a delivery is in progress.
pub struct Signal<S: 'static, T: 'static> {
    list: Rc<SlotList<S, T>>,
}

impl<S: 'static, T: 'static> Signal<S, T> {
    /// Create a signal with no subscribers.
    pub fn new() -> Self {
        Self {
            list: Rc::new(SlotList {
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Register a subscriber for every future emission.
    ///
    /// The same closure may be connected several times; each connection
    /// is invoked independently.
    pub fn connect<F>(&self, slot: F) -> Connection
    where
        F: Fn(&S, &T) -> SlotResult + 'static,
    {
        let id = ConnectionId(self.list.next_id.get());
        self.list.next_id.set(id.0 + 1);
        self.list.subscribers.borrow_mut().push(Subscriber {
            id,
            slot: Rc::new(slot),
        });

        let list: Rc<dyn Detach> = self.list.clone();
        Connection {
            id,
            list: Rc::downgrade(&list),
        }
    }

    /// Remove the subscriber identified by `connection`.
    ///
    /// No-op (returns false) if it was already removed or belongs to a
    /// different signal.
    pub fn disconnect(&self, connection: &Connection) -> bool {
        if !self.owns(connection) {
            return false;
        }
        self.list.detach(connection.id)
    }

    /// Remove every subscriber.
    pub fn disconnect_all(&self) {
        self.list.subscribers.borrow_mut().clear();
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.list.subscribers.borrow().len()
    }

    /// Whether no subscriber is connected.
    pub fn is_empty(&self) -> bool {
        self.subscriber_count() == 0
    }

    /// Deliver `payload` to every subscriber connected at call time, in
    /// connection order.
    ///
    /// Subscribers connected during this emission are first invoked by
    /// the next one. Subscribers disconnected during this emission are
    /// skipped if not yet reached. Subscriber errors are reported and do
    /// not interrupt delivery.
    pub fn emit(&self, sender: &S, payload: &T) -> EmitReport {
        let snapshot: Vec<Subscriber<S, T>> = self.list.subscribers.borrow().clone();
        let mut report_summary = EmitReport::default();

        for subscriber in snapshot {
            if !self.list.contains(subscriber.id) {
                continue;
            }

            report_summary.delivered += 1;
            if let Err(source) = (subscriber.slot)(sender, payload) {
                report_summary.failed += 1;
                report(SubscriberError {
                    signal: std::any::type_name::<T>(),
                    connection: subscriber.id,
                    source,
                });
            }
        }

        report_summary
    }

    fn owns(&self, connection: &Connection) -> bool {
        let ours = Rc::as_ptr(&self.list) as *const ();
        connection
            .list
            .upgrade()
            .map(|theirs| Rc::as_ptr(&theirs) as *const () == ours)
            .unwrap_or(false)
    }
}

impl<S: 'static, T: 'static> Default for Signal<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static, T: 'static> fmt::Debug for Signal<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("payload", &std::any::type_name::<T>())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set_exception_handler;

    struct Sender {
        name: &'static str,
    }

    fn sender() -> Sender {
        Sender { name: "source" }
    }

    #[test]
    fn test_emit_in_connection_order() {
        let signal: Signal<Sender, u32> = Signal::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let calls = calls.clone();
            signal.connect(move |s: &Sender, v: &u32| {
                calls.borrow_mut().push(format!("{}:{}:{}", tag, s.name, v));
                Ok(())
            });
        }

        let summary = signal.emit(&sender(), &5);
        assert_eq!(summary, EmitReport { delivered: 3, failed: 0 });
        assert_eq!(
            *calls.borrow(),
            vec!["a:source:5", "b:source:5", "c:source:5"]
        );
    }

    #[test]
    fn test_disconnect_removes_exactly_one() {
        let signal: Signal<Sender, ()> = Signal::new();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let connections: Vec<_> = (0..3)
            .map(|i| {
                let hits = hits.clone();
                signal.connect(move |_: &Sender, _: &()| {
                    hits.borrow_mut().push(i);
                    Ok(())
                })
            })
            .collect();

        assert!(signal.disconnect(&connections[1]));
        assert!(!signal.disconnect(&connections[1]));
        assert!(!connections[1].is_connected());

        signal.emit(&sender(), &());
        assert_eq!(*hits.borrow(), vec![0, 2]);
        assert_eq!(signal.subscriber_count(), 2);
    }

    #[test]
    fn test_same_closure_connected_twice_runs_twice() {
        let signal: Signal<Sender, ()> = Signal::new();
        let count = Rc::new(Cell::new(0));
        let slot = {
            let count = count.clone();
            move |_: &Sender, _: &()| {
                count.set(count.get() + 1);
                Ok(())
            }
        };

        signal.connect(slot.clone());
        signal.connect(slot);
        signal.emit(&sender(), &());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_failing_subscriber_does_not_stop_delivery() {
        let reported = Rc::new(RefCell::new(Vec::new()));
        {
            let reported = reported.clone();
            set_exception_handler(move |err| reported.borrow_mut().push(err.connection));
        }

        let signal: Signal<Sender, u32> = Signal::new();
        let later = Rc::new(Cell::new(false));
        let failing = signal.connect(|_: &Sender, _: &u32| anyhow::bail!("subscriber broke"));
        {
            let later = later.clone();
            signal.connect(move |_: &Sender, _: &u32| {
                later.set(true);
                Ok(())
            });
        }

        let summary = signal.emit(&sender(), &1);
        crate::reset_exception_handler();

        assert!(later.get());
        assert_eq!(summary, EmitReport { delivered: 2, failed: 1 });
        assert_eq!(*reported.borrow(), vec![failing.id()]);
    }

    #[test]
    fn test_connect_during_emit_waits_for_next_emission() {
        let signal: Rc<Signal<Sender, ()>> = Rc::new(Signal::new());
        let late_hits = Rc::new(Cell::new(0));

        {
            let weak = Rc::downgrade(&signal);
            let late_hits = late_hits.clone();
            signal.connect(move |_: &Sender, _: &()| {
                if let Some(signal) = weak.upgrade() {
                    let late_hits = late_hits.clone();
                    signal.connect(move |_: &Sender, _: &()| {
                        late_hits.set(late_hits.get() + 1);
                        Ok(())
                    });
                }
                Ok(())
            });
        }

        signal.emit(&sender(), &());
        assert_eq!(late_hits.get(), 0);
        assert_eq!(signal.subscriber_count(), 2);

        signal.emit(&sender(), &());
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_disconnect_during_emit_skips_unreached_subscriber() {
        let signal: Signal<Sender, ()> = Signal::new();
        let victim_token: Rc<RefCell<Option<Connection>>> = Rc::new(RefCell::new(None));
        let victim_hits = Rc::new(Cell::new(0));

        {
            let victim_token = victim_token.clone();
            signal.connect(move |_: &Sender, _: &()| {
                if let Some(token) = victim_token.borrow().as_ref() {
                    token.disconnect();
                }
                Ok(())
            });
        }
        let victim = {
            let victim_hits = victim_hits.clone();
            signal.connect(move |_: &Sender, _: &()| {
                victim_hits.set(victim_hits.get() + 1);
                Ok(())
            })
        };
        *victim_token.borrow_mut() = Some(victim);

        let summary = signal.emit(&sender(), &());
        assert_eq!(victim_hits.get(), 0);
        assert_eq!(summary.delivered, 1);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn test_subscriber_may_disconnect_itself() {
        let signal: Signal<Sender, ()> = Signal::new();
        let own: Rc<RefCell<Option<Connection>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));

        let connection = {
            let own = own.clone();
            let hits = hits.clone();
            signal.connect(move |_: &Sender, _: &()| {
                hits.set(hits.get() + 1);
                if let Some(token) = own.borrow().as_ref() {
                    token.disconnect();
                }
                Ok(())
            })
        };
        *own.borrow_mut() = Some(connection);

        signal.emit(&sender(), &());
        signal.emit(&sender(), &());
        assert_eq!(hits.get(), 1);
        assert!(signal.is_empty());
    }

    #[test]
    fn test_connection_inert_after_signal_dropped() {
        let signal: Signal<Sender, ()> = Signal::new();
        let connection = signal.connect(|_: &Sender, _: &()| Ok(()));
        assert!(connection.is_connected());

        drop(signal);
        assert!(!connection.is_connected());
        assert!(!connection.disconnect());
    }

    #[test]
    fn test_foreign_connection_is_ignored() {
        let first: Signal<Sender, ()> = Signal::new();
        let second: Signal<Sender, ()> = Signal::new();
        let connection = first.connect(|_: &Sender, _: &()| Ok(()));
        second.connect(|_: &Sender, _: &()| Ok(()));

        assert!(!second.disconnect(&connection));
        assert_eq!(second.subscriber_count(), 1);
        assert!(connection.is_connected());
    }

    #[test]
    fn test_disconnect_all() {
        let signal: Signal<Sender, ()> = Signal::new();
        let a = signal.connect(|_: &Sender, _: &()| Ok(()));
        signal.connect(|_: &Sender, _: &()| Ok(()));

        signal.disconnect_all();
        assert!(signal.is_empty());
        assert!(!a.is_connected());
        assert_eq!(signal.emit(&sender(), &()), EmitReport::default());
    }
}
