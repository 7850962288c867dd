//! Utilities for *events* of ECS.
//!
//! Events are dispatched synchronously: [`EventBus::publish`] returns only
//! after every subscriber of the event type has been called, in the order
//! in which the subscribers were added.

use std::any::Any;
use std::marker::PhantomData;

use anymap2::AnyMap;

use super::{ComponentType, Entity};

/// Objects of this trait can be sent through the [`EventBus`].
pub trait Event: Any {}

impl<T> Event for T where T: Any {}

/// Emitted after a component was attached to the entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComponentAdded {
    pub entity: Entity,
    pub component: ComponentType,
}

/// Emitted after a component was detached from the entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComponentRemoved {
    pub entity: Entity,
    pub component: ComponentType,
}

/// Emitted after a new entity was created.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EntityCreated {
    pub entity: Entity,
}

/// Emitted after the entity was destroyed and all of its components were detached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EntityDestroyed {
    pub entity: Entity,
}

/// Handle of the subscriber which can be used to unsubscribe it later.
#[derive(Debug)]
pub struct Subscription<E> {
    id: u64,
    marker: PhantomData<fn(&E)>,
}

impl<E> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Subscription<E> {}

impl<E> PartialEq for Subscription<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for Subscription<E> {}

type Handler<E> = Box<dyn FnMut(&E)>;

struct Subscribers<E> {
    handlers: Vec<(u64, Handler<E>)>,
}

/// Synchronous publish/subscribe channel for events of any type.
pub struct EventBus {
    subscribers: AnyMap,
    next_id: u64,
}

impl EventBus {
    /// Creates an event bus without subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: AnyMap::new(),
            next_id: 0,
        }
    }

    /// Adds subscriber for events of type `E`.
    pub fn subscribe<E, F>(&mut self, handler: F) -> Subscription<E>
    where
        E: Event,
        F: FnMut(&E) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let handler: Handler<E> = Box::new(handler);
        match self.subscribers.get_mut::<Subscribers<E>>() {
            Some(subscribers) => subscribers.handlers.push((id, handler)),
            None => {
                let handlers = vec![(id, handler)];
                self.subscribers.insert(Subscribers { handlers });
            }
        }
        Subscription {
            id,
            marker: PhantomData,
        }
    }

    /// Removes the subscriber.
    ///
    /// Returns `true` if the subscriber was still subscribed.
    ///
    pub fn unsubscribe<E>(&mut self, subscription: Subscription<E>) -> bool
    where
        E: Event,
    {
        let subscribers = match self.subscribers.get_mut::<Subscribers<E>>() {
            Some(subscribers) => subscribers,
            None => return false,
        };
        let len = subscribers.handlers.len();
        subscribers
            .handlers
            .retain(|(id, _)| *id != subscription.id);
        subscribers.handlers.len() != len
    }

    /// Calls every subscriber of events of type `E`.
    pub fn publish<E>(&mut self, event: &E)
    where
        E: Event,
    {
        if let Some(subscribers) = self.subscribers.get_mut::<Subscribers<E>>() {
            for (_, handler) in subscribers.handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Number of subscribers of events of type `E`.
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: Event,
    {
        self.subscribers
            .get::<Subscribers<E>>()
            .map(|subscribers| subscribers.handlers.len())
            .unwrap_or(0)
    }

    /// Removes all subscribers of all event types.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
