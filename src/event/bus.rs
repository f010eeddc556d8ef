use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/*
Event Bus
=========

A typed, synchronous publish/subscribe channel. Each event kind gets its own
bus; `EventSystem` bundles them so the voice manager, the display simulator
and the host all share the same handles without globals.

  publish(&event)
      │
      ├──▶ subscriber 1   (in subscription order)
      ├──▶ subscriber 2
      └──▶ ...

Delivery happens on the publishing thread before `publish` returns. The list
of handlers is snapshotted first, so a subscriber may drop its own (or any
other) `Subscription` while being called. A subscriber must not publish on
the bus that is currently calling it.

Subscriptions are RAII guards: dropping the guard removes the handler.
*/

type Handler<E> = Arc<Mutex<dyn FnMut(&E) + Send>>;

struct Registry<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<E: 'static> Detach for Mutex<Registry<E>> {
    fn detach(&self, id: u64) {
        lock(self).handlers.retain(|(handler_id, _)| *handler_id != id);
    }
}

pub struct EventBus<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Register a handler. It stays registered until the returned guard is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&E) + Send + 'static,
    {
        let handler: Handler<E> = Arc::new(Mutex::new(handler));
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, handler));
            id
        };

        let registry: Arc<dyn Detach> = self.registry.clone();
        Subscription {
            id,
            registry: Arc::downgrade(&registry),
        }
    }

    /// Deliver `event` to every subscriber, in subscription order.
    pub fn publish(&self, event: &E) {
        let handlers: Vec<Handler<E>> = lock(&self.registry)
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            let mut handler = lock(&handler);
            (&mut *handler)(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).handlers.len()
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Keeps a handler registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Detach>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Lock a mutex, recovering the data if another holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
