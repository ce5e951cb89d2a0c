//! # Framework Errors
//!
//! Errors produced by the actor plumbing itself, plus the entity's own error carried through
//! unboxed so clients can match on it.

/// Errors that can occur while talking to a `ResourceActor`.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError<E: std::error::Error + 'static> {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Entity(E),
}

impl<E: std::error::Error + 'static> FrameworkError<E> {
    /// True when the actor could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::ActorClosed | Self::ActorDropped)
    }
}
