//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every stored resource (Product, Cart, Order,
//! Customer, …) implements to be managed by the generic `ResourceActor`. It names the key,
//! the DTOs, the custom actions, the injected context and the error type, and provides the
//! lifecycle hooks (`on_create`, `on_update`, `on_delete`, `handle_action`).
//!
//! # Keys
//! The entity decides its own key through [`ActorEntity::assign_id`]. Sequence-keyed
//! resources (products, customers) derive it from the counter the actor hands in; naturally
//! keyed resources (a cart keyed by its customer, an order keyed by its order number) take
//! it from the create payload. The actor rejects a create whose key is already present.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//! - [`ActorEntity::sequence`]
//!
//! The default implementations do nothing.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// This trait is `#[async_trait]` so hooks can await other actors. The `Context` type is
/// injected into every hook, which allows late binding of dependencies (passing clients to
/// `run()` instead of `new()`).
///
/// # Hook atomicity
/// `on_update` and `handle_action` run against a working copy of the stored entity. The copy
/// replaces the stored value only when the hook returns `Ok`, so a hook that fails halfway
/// through never leaves a partially mutated entity behind.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique key for this entity.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g. `Reserve`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The per-actor error type, returned unboxed through `FrameworkError::Entity`.
    ///
    /// One enum per actor rather than one per message: clients match on a single type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Chooses the key for a new entity.
    ///
    /// `sequence` is the actor's monotonically increasing counter (starting at 1).
    fn assign_id(sequence: u64, params: &Self::Create) -> Self::Id;

    /// The key of an existing entity. Used to index seeded entities.
    fn id(&self) -> Self::Id;

    /// The sequence number this entity's key was derived from, if any.
    ///
    /// Seeding uses it to resume the counter past restored keys.
    fn sequence(&self) -> Option<u64> {
        None
    }

    /// Construct the full entity from the key and payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the store.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
