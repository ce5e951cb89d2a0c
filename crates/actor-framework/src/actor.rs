//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the component that owns an entity store and
//! processes requests against it sequentially. Because every request for a store is handled
//! inside one loop, a check-and-mutate performed by a hook (e.g. "decrement stock only if
//! enough is left") is indivisible with respect to every other request on that store.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// The actor owns the `store` and the receiving end of its channel. It runs in its own Tokio
/// task and handles one message at a time, so the store needs no `Mutex`.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` returns the actor (server) and a client.
/// 2.  **Wire**: pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Sku { id: u64, stock: u32 }
/// #[derive(Debug)] struct SkuCreate { stock: u32 }
/// #[derive(Debug)] struct SkuUpdate;
/// #[derive(Debug)] enum SkuAction { Take(u32) }
/// #[derive(Debug, thiserror::Error)] #[error("out of stock")] struct OutOfStock;
///
/// #[async_trait]
/// impl ActorEntity for Sku {
///     type Id = u64;
///     type Create = SkuCreate;
///     type Update = SkuUpdate;
///     type Action = SkuAction;
///     type ActionResult = u32;
///     type Context = ();
///     type Error = OutOfStock;
///
///     fn assign_id(sequence: u64, _: &SkuCreate) -> u64 { sequence }
///     fn id(&self) -> u64 { self.id }
///     fn from_create_params(id: u64, params: SkuCreate) -> Result<Self, OutOfStock> {
///         Ok(Self { id, stock: params.stock })
///     }
///     async fn on_update(&mut self, _: SkuUpdate, _: &()) -> Result<(), OutOfStock> { Ok(()) }
///     async fn handle_action(&mut self, action: SkuAction, _: &()) -> Result<u32, OutOfStock> {
///         match action {
///             SkuAction::Take(n) if n <= self.stock => { self.stock -= n; Ok(self.stock) }
///             SkuAction::Take(_) => Err(OutOfStock),
///         }
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Sku>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let sku = client.create(SkuCreate { stock: 3 }).await.unwrap();
///     assert_eq!(client.perform_action(sku.id, SkuAction::Take(2)).await.unwrap(), 1);
///     assert!(client.perform_action(sku.id, SkuAction::Take(2)).await.is_err());
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_sequence: u64,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` with an empty store and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the MPSC channel; when it is full, client calls wait.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        Self::with_entities(buffer_size, Vec::new())
    }

    /// Creates an actor whose store is seeded with `entities` (e.g. a restored snapshot).
    ///
    /// The key counter resumes after the highest restored sequence number.
    pub fn with_entities(buffer_size: usize, entities: Vec<T>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let next_sequence = entities
            .iter()
            .filter_map(|entity| entity.sequence())
            .max()
            .unwrap_or(0)
            + 1;
        let store = entities
            .into_iter()
            .map(|entity| (entity.id(), entity))
            .collect();
        let actor = Self {
            receiver,
            store,
            next_sequence,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// `context` is handed to every entity hook, so entities can reach dependencies (other
    /// clients) that were created after this actor but before its loop started.
    pub async fn run(mut self, context: T::Context) {
        // Just the type name: "Cart" rather than "retail::model::cart::Cart"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, size = self.store.len(), "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::assign_id(self.next_sequence, &params);
                    if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Create rejected: key exists");
                        let _ = respond_to.send(Err(FrameworkError::AlreadyExists(id.to_string())));
                        continue;
                    }

                    let mut item = match T::from_create_params(id.clone(), params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                            continue;
                        }
                    };
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        continue;
                    }
                    self.next_sequence += 1;
                    self.store.insert(id.clone(), item.clone());
                    info!(entity_type, %id, size = self.store.len(), "Created");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut working = current.clone();
                    match working.on_update(update, &context).await {
                        Ok(()) => {
                            self.store.insert(id.clone(), working.clone());
                            info!(entity_type, %id, "Updated");
                            let _ = respond_to.send(Ok(working));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        }
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut working = current.clone();
                    match working.handle_action(action, &context).await {
                        Ok(result) => {
                            self.store.insert(id.clone(), working);
                            info!(entity_type, %id, "Action ok");
                            let _ = respond_to.send(Ok(result));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        }
                    }
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        key: String,
        value: i64,
        seq: u64,
    }

    #[derive(Debug)]
    struct CounterCreate {
        key: Option<String>,
    }

    #[derive(Debug)]
    struct CounterUpdate;

    #[derive(Debug)]
    enum CounterAction {
        /// Adds both values one after the other; fails if the result would go negative.
        AddTwice(i64, i64),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("counter would go negative")]
    struct Negative;

    #[async_trait]
    impl ActorEntity for Counter {
        type Id = String;
        type Create = CounterCreate;
        type Update = CounterUpdate;
        type Action = CounterAction;
        type ActionResult = i64;
        type Context = ();
        type Error = Negative;

        fn assign_id(sequence: u64, params: &CounterCreate) -> String {
            params
                .key
                .clone()
                .unwrap_or_else(|| format!("counter_{sequence}"))
        }

        fn id(&self) -> String {
            self.key.clone()
        }

        fn sequence(&self) -> Option<u64> {
            Some(self.seq)
        }

        fn from_create_params(id: String, _: CounterCreate) -> Result<Self, Negative> {
            let seq = id
                .strip_prefix("counter_")
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            Ok(Self { key: id, value: 0, seq })
        }

        async fn on_update(&mut self, _: CounterUpdate, _: &()) -> Result<(), Negative> {
            Ok(())
        }

        async fn handle_action(&mut self, action: CounterAction, _: &()) -> Result<i64, Negative> {
            match action {
                CounterAction::AddTwice(a, b) => {
                    self.value += a;
                    if self.value < 0 {
                        return Err(Negative);
                    }
                    self.value += b;
                    if self.value < 0 {
                        return Err(Negative);
                    }
                    Ok(self.value)
                }
            }
        }
    }

    #[tokio::test]
    async fn failed_action_leaves_stored_entity_untouched() {
        let (actor, client) = ResourceActor::<Counter>::new(8);
        tokio::spawn(actor.run(()));

        let counter = client.create(CounterCreate { key: None }).await.unwrap();
        client
            .perform_action(counter.key.clone(), CounterAction::AddTwice(5, 0))
            .await
            .unwrap();

        // First half succeeds on the working copy, second half fails.
        let result = client
            .perform_action(counter.key.clone(), CounterAction::AddTwice(10, -100))
            .await;
        assert!(matches!(result, Err(FrameworkError::Entity(Negative))));

        let stored = client.get(counter.key).await.unwrap().unwrap();
        assert_eq!(stored.value, 5);
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected() {
        let (actor, client) = ResourceActor::<Counter>::new(8);
        tokio::spawn(actor.run(()));

        let fixed = || CounterCreate {
            key: Some("fixed".into()),
        };
        client.create(fixed()).await.unwrap();
        let second = client.create(fixed()).await;
        assert!(matches!(second, Err(FrameworkError::AlreadyExists(key)) if key == "fixed"));
        assert_eq!(client.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seeded_actor_resumes_sequence() {
        let seed = vec![
            Counter { key: "counter_1".into(), value: 1, seq: 1 },
            Counter { key: "counter_7".into(), value: 7, seq: 7 },
        ];
        let (actor, client) = ResourceActor::with_entities(8, seed);
        tokio::spawn(actor.run(()));

        let restored = client.get("counter_7".to_string()).await.unwrap().unwrap();
        assert_eq!(restored.value, 7);

        let fresh = client.create(CounterCreate { key: None }).await.unwrap();
        assert_eq!(fresh.key, "counter_8");
    }
}
