use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::warn;

type Listener = Box<dyn Fn(usize)>;

struct BusyState {
    count: Cell<usize>,
    listener: RefCell<Option<Listener>>,
}

/// Count of in-flight operations that should show a loading indicator.
///
/// Clones share one counter. The count never goes below zero; an unmatched
/// decrement is logged and ignored. Every change is reported to the listener.
///
/// Prefer [`BusyCounter::enter`] for async work: the returned guard releases
/// its increment when dropped, on success and error paths alike.
#[derive(Clone)]
pub struct BusyCounter {
    state: Rc<BusyState>,
}

impl fmt::Debug for BusyCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusyCounter")
            .field("count", &self.count())
            .finish()
    }
}

impl Default for BusyCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyCounter {
    pub fn new() -> Self {
        Self {
            state: Rc::new(BusyState {
                count: Cell::new(0),
                listener: RefCell::new(None),
            }),
        }
    }

    pub fn with_listener(listener: impl Fn(usize) + 'static) -> Self {
        let counter = Self::new();
        counter.set_listener(listener);
        counter
    }

    pub fn set_listener(&self, listener: impl Fn(usize) + 'static) {
        *self.state.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn count(&self) -> usize {
        self.state.count.get()
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    pub fn increment(&self) {
        let next = self.state.count.get() + 1;
        self.state.count.set(next);
        self.notify(next);
    }

    pub fn decrement(&self) {
        let current = self.state.count.get();
        if current == 0 {
            warn!("busy counter decremented below zero; ignoring");
            return;
        }
        self.state.count.set(current - 1);
        self.notify(current - 1);
    }

    /// Increments now and decrements when the guard is dropped.
    pub fn enter(&self) -> BusyGuard {
        self.increment();
        BusyGuard {
            counter: self.clone(),
        }
    }

    fn notify(&self, count: usize) {
        if let Some(listener) = self.state.listener.borrow().as_ref() {
            listener(count);
        }
    }
}

/// Holds one increment of a [`BusyCounter`] until dropped.
#[must_use = "dropping the guard immediately releases the busy count"]
pub struct BusyGuard {
    counter: BusyCounter,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}
