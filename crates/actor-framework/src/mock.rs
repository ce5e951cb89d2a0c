//! # Mock Framework & Testing Guide
//!
//! `MockClient<T>` hands out a real `ResourceClient<T>` whose requests are answered from a
//! queue of scripted expectations instead of a running actor. It lets services that sit on
//! top of several actors (a checkout calling carts, products and orders) be tested one
//! dependency at a time, including failures that are hard to provoke with real actors.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | Scripted order | Subject to scheduler |
//! | **State** | None (expectations) | Real state management |
//! | **Error Injection** | Easy (`return_err`) | Requires specific state |
//!
//! ## Scripting expectations
//!
//! Expectations are consumed in the order they were registered. A request whose kind or key
//! does not match the next expectation is answered with `ActorDropped` and recorded;
//! [`MockClient::verify`] then panics with the recorded mismatches.
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Shelf { id: u64, units: u32 }
//! #[derive(Debug)] struct ShelfCreate;
//! #[derive(Debug)] struct ShelfUpdate;
//! #[derive(Debug)] enum ShelfAction { Pick(u32) }
//! #[derive(Debug, thiserror::Error)] #[error("empty shelf")] struct EmptyShelf;
//!
//! #[async_trait]
//! impl ActorEntity for Shelf {
//!     type Id = u64; type Create = ShelfCreate; type Update = ShelfUpdate;
//!     type Action = ShelfAction; type ActionResult = u32; type Context = (); type Error = EmptyShelf;
//!     fn assign_id(sequence: u64, _: &ShelfCreate) -> u64 { sequence }
//!     fn id(&self) -> u64 { self.id }
//!     fn from_create_params(id: u64, _: ShelfCreate) -> Result<Self, EmptyShelf> { Ok(Self { id, units: 0 }) }
//!     async fn on_update(&mut self, _: ShelfUpdate, _: &()) -> Result<(), EmptyShelf> { Ok(()) }
//!     async fn handle_action(&mut self, _: ShelfAction, _: &()) -> Result<u32, EmptyShelf> { Ok(self.units) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Shelf>::new();
//!     mock.expect_get(1).return_ok(Some(Shelf { id: 1, units: 4 }));
//!     mock.expect_action(1).return_err(FrameworkError::Entity(EmptyShelf));
//!
//!     let client = mock.client();
//!     assert_eq!(client.get(1).await.unwrap().unwrap().units, 4);
//!     let picked = client.perform_action(1, ShelfAction::Pick(9)).await;
//!     assert!(matches!(picked, Err(FrameworkError::Entity(EmptyShelf))));
//!
//!     mock.verify();
//! }
//! ```
//!
//! ## Low-level helpers
//!
//! [`create_mock_client`] returns a client plus the raw receiver; [`expect_create`],
//! [`expect_get`] and [`expect_action`] pull the next request off it so a test can assert on
//! the payload and answer by hand.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

type Reply<T, R> = Result<R, FrameworkError<<T as ActorEntity>::Error>>;

/// A scripted answer for the next request.
enum Expectation<T: ActorEntity> {
    Create { response: Reply<T, T> },
    Get { id: T::Id, response: Reply<T, Option<T>> },
    List { response: Reply<T, Vec<T>> },
    Update { id: T::Id, response: Reply<T, T> },
    Delete { id: T::Id, response: Reply<T, ()> },
    Action { id: T::Id, response: Reply<T, T::ActionResult> },
}

type Script<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Script<T>,
    mismatches: Arc<Mutex<Vec<String>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn answer<T: ActorEntity, R>(respond_to: Response<T, R>, response: Reply<T, R>) {
    let _ = respond_to.send(response);
}

fn check_id<T: ActorEntity>(expected: &T::Id, got: &T::Id, mismatches: &Mutex<Vec<String>>) -> bool {
    if expected == got {
        return true;
    }
    if let Ok(mut log) = mismatches.lock() {
        log.push(format!("expected key {expected}, got {got}"));
    }
    false
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Script<T> = Arc::new(Mutex::new(VecDeque::new()));
        let mismatches = Arc::new(Mutex::new(Vec::new()));
        let script = expectations.clone();
        let log = mismatches.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = script.lock().ok().and_then(|mut queue| queue.pop_front());

                match (request, next) {
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                        answer::<T, _>(respond_to, response);
                    }
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response })) => {
                        if check_id::<T>(&want, &id, &log) {
                            answer::<T, _>(respond_to, response);
                        } else {
                            answer::<T, _>(respond_to, Err(FrameworkError::ActorDropped));
                        }
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        answer::<T, _>(respond_to, response);
                    }
                    (ResourceRequest::Update { id, respond_to, .. }, Some(Expectation::Update { id: want, response })) => {
                        if check_id::<T>(&want, &id, &log) {
                            answer::<T, _>(respond_to, response);
                        } else {
                            answer::<T, _>(respond_to, Err(FrameworkError::ActorDropped));
                        }
                    }
                    (ResourceRequest::Delete { id, respond_to }, Some(Expectation::Delete { id: want, response })) => {
                        if check_id::<T>(&want, &id, &log) {
                            answer::<T, _>(respond_to, response);
                        } else {
                            answer::<T, _>(respond_to, Err(FrameworkError::ActorDropped));
                        }
                    }
                    (ResourceRequest::Action { id, action, respond_to }, Some(Expectation::Action { id: want, response })) => {
                        if check_id::<T>(&want, &id, &log) {
                            answer::<T, _>(respond_to, response);
                        } else {
                            if let Ok(mut log) = log.lock() {
                                log.push(format!("unexpected action {action:?}"));
                            }
                            answer::<T, _>(respond_to, Err(FrameworkError::ActorDropped));
                        }
                    }
                    (request, _) => {
                        // Dropping the request drops its responder; the caller sees ActorDropped.
                        if let Ok(mut log) = log.lock() {
                            log.push(format!("unexpected request {}", describe(&request)));
                        }
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            mismatches,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn push(&self, expectation: Expectation<T>) {
        if let Ok(mut queue) = self.expectations.lock() {
            queue.push_back(expectation);
        }
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder::new(self, |response| Expectation::Create { response })
    }

    /// Expects a `get` operation for `id`.
    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, Option<T>> {
        ExpectationBuilder::new(self, move |response| Expectation::Get { id, response })
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<'_, T, Vec<T>> {
        ExpectationBuilder::new(self, |response| Expectation::List { response })
    }

    /// Expects an `update` operation on `id`.
    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder::new(self, move |response| Expectation::Update { id, response })
    }

    /// Expects a `delete` operation on `id`.
    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, ()> {
        ExpectationBuilder::new(self, move |response| Expectation::Delete { id, response })
    }

    /// Expects an `action` on `id`.
    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, T::ActionResult> {
        ExpectationBuilder::new(self, move |response| Expectation::Action { id, response })
    }

    /// Panics unless every expectation was consumed by a matching request.
    pub fn verify(&self) {
        let mismatches = self.mismatches.lock().map(|m| m.clone()).unwrap_or_default();
        if !mismatches.is_empty() {
            panic!("Mock received mismatched requests: {mismatches:?}");
        }
        let remaining = self.expectations.lock().map(|q| q.len()).unwrap_or_default();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

fn describe<T: ActorEntity>(request: &ResourceRequest<T>) -> String {
    match request {
        ResourceRequest::Create { params, .. } => format!("Create({params:?})"),
        ResourceRequest::Get { id, .. } => format!("Get({id})"),
        ResourceRequest::List { .. } => "List".to_string(),
        ResourceRequest::Update { id, .. } => format!("Update({id})"),
        ResourceRequest::Delete { id, .. } => format!("Delete({id})"),
        ResourceRequest::Action { id, action, .. } => format!("Action({id}, {action:?})"),
    }
}

/// Builder that completes one expectation with a success or an error.
pub struct ExpectationBuilder<'a, T: ActorEntity, R> {
    mock: &'a MockClient<T>,
    make: Box<dyn FnOnce(Reply<T, R>) -> Expectation<T> + Send + 'a>,
}

impl<'a, T: ActorEntity, R> ExpectationBuilder<'a, T, R> {
    fn new(
        mock: &'a MockClient<T>,
        make: impl FnOnce(Reply<T, R>) -> Expectation<T> + Send + 'a,
    ) -> Self {
        Self {
            mock,
            make: Box::new(make),
        }
    }

    /// Answers the request with `value`.
    pub fn return_ok(self, value: R) {
        self.mock.push((self.make)(Ok(value)));
    }

    /// Answers the request with `error`.
    pub fn return_err(self, error: FrameworkError<T::Error>) {
        self.mock.push((self.make)(Err(error)));
    }
}

// =============================================================================
// LOW-LEVEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// Use this when a test needs to inspect the payload of a request before answering it.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Pulls the next request if it is a Create.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, Response<T, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Pulls the next request if it is a Get.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<T, Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Pulls the next request if it is an Action.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T, T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
