use std::any::{Any, TypeId};
use std::sync::{Arc, Weak};
use parking_lot::Mutex;
use ahash::AHashMap;

/// Identifier handed out for each registered handler
pub type SubscriptionId = u64;

/// System-wide event bus
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    next_id: SubscriptionId,
    handlers: AHashMap<TypeId, Vec<(SubscriptionId, Box<dyn EventHandler>)>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Reader events
pub mod events {
    use super::Event;
    use crate::reference::Reference;

    /// The current reference was committed
    #[derive(Debug, Clone)]
    pub struct ReferenceChanged {
        pub previous: Reference,
        pub current: Reference,
    }

    /// The book list arrived
    #[derive(Debug, Clone)]
    pub struct BooksLoaded {
        pub book_count: usize,
    }

    /// The book list could not be retrieved
    #[derive(Debug, Clone)]
    pub struct BooksFailed {
        pub error: String,
    }

    /// Chapter markup was applied to the display
    #[derive(Debug, Clone)]
    pub struct ContentLoaded {
        pub reference: Reference,
        pub bytes: usize,
    }

    /// Chapter markup could not be retrieved
    #[derive(Debug, Clone)]
    pub struct ContentFailed {
        pub reference: Reference,
        pub error: String,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        ReferenceChanged,
        BooksLoaded,
        BooksFailed,
        ContentLoaded,
        ContentFailed
    );
}

/// Keeps a handler registered; dropping it unregisters the handler.
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    id: SubscriptionId,
    type_id: TypeId,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.type_id, self.id);
        }
    }
}

impl Registry {
    fn remove(&mut self, type_id: TypeId, id: SubscriptionId) {
        if let Some(list) = self.handlers.get_mut(&type_id) {
            list.retain(|(handler_id, _)| *handler_id != id);
            if list.is_empty() {
                self.handlers.remove(&type_id);
            }
        }
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Subscribe to events of a specific type.
    ///
    /// Handlers run while the bus is locked and must not publish or
    /// subscribe from inside `handle`.
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) -> Subscription {
        let type_id = TypeId::of::<E>();
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.handlers.entry(type_id).or_default().push((id, handler));

        Subscription {
            id,
            type_id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Subscribe a closure that receives the concrete event type
    pub fn subscribe_fn<E, F>(&self, mut f: F) -> Subscription
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(handler_from_fn(move |event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                f(event);
            }
        }))
    }

    /// Explicitly unregister a subscription
    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = TypeId::of::<E>();
        let mut registry = self.registry.lock();

        if let Some(event_handlers) = registry.handlers.get_mut(&type_id) {
            for (_, handler) in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }

    /// Number of handlers registered for an event type
    pub fn handler_count<E: Event>(&self) -> usize {
        self.registry
            .lock()
            .handlers
            .get(&TypeId::of::<E>())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}
