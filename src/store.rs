//! Single-threaded observable state with explicit subscriptions.
//!
//! Current path, session state, scroll signal and the composed view are all held in
//! `Store`s. Writers keep the `Store`; everyone else gets a read-only `Signal`.
//! Subscribing hands back a `Subscription` that detaches its callback when dropped.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// Store
///
/// Shared, observable value. Cloning a `Store` clones the handle, not the value.
pub struct Store<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: Clone + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                value,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.slot.borrow().value.clone()
    }

    /// Replaces the value and notifies every subscriber.
    pub fn set(&self, value: T) {
        self.slot.borrow_mut().value = value.clone();
        self.notify(&value);
    }

    /// Registers `callback` for every future write.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        let id = {
            let mut slot = self.slot.borrow_mut();
            let id = slot.next_id;
            slot.next_id += 1;
            slot.subscribers.push((id, callback));
            id
        };

        let weak: Weak<RefCell<Slot<T>>> = Rc::downgrade(&self.slot);
        Subscription::new(move || {
            if let Some(slot) = weak.upgrade() {
                slot.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.slot.borrow().subscribers.len()
    }

    /// Read-only handle for observers that must never write.
    pub fn signal(&self) -> Signal<T> {
        Signal {
            store: self.clone(),
        }
    }

    fn notify(&self, value: &T) {
        // Callbacks run with no borrow held so they may read or write stores freely.
        let callbacks: Vec<Callback<T>> = self
            .slot
            .borrow()
            .subscribers
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }
}

impl<T: Clone + PartialEq + 'static> Store<T> {
    /// Writes and notifies only when the value actually changes. Returns whether it did.
    pub fn set_if_changed(&self, value: T) -> bool {
        if self.slot.borrow().value == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Store").field(&self.slot.borrow().value).finish()
    }
}

/// Signal
///
/// Read-only view of a `Store`.
pub struct Signal<T> {
    store: Store<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub fn get(&self) -> T {
        self.store.get()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.store.subscribe(callback)
    }
}

/// Subscription
///
/// Scoped registration of a listener. The listener is removed when this value is
/// dropped or `unsubscribe` is called, on every exit path.
#[must_use = "dropping a Subscription immediately detaches the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
