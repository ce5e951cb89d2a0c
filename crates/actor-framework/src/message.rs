//! # Generic Messages
//!
//! The request envelope sent from a `ResourceClient` to its `ResourceActor`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// One-shot response channel for a request against entity type `T` yielding `R`.
pub type Response<T, R> = oneshot::Sender<Result<R, FrameworkError<<T as ActorEntity>::Error>>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants map onto CRUD plus two extras: `Action` for resource-specific logic (stock
/// reservation, cart mutation, order transitions) and `List` for whole-store reads
/// (per-customer order listings, snapshots).
///
/// The type is generic over `T: ActorEntity`, so a cart payload can never reach the product
/// actor.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T, T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<T, Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T, T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T, ()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T, T::ActionResult>,
    },
    List {
        respond_to: Response<T, Vec<T>>,
    },
}
