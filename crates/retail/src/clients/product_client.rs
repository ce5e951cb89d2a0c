//! # Product Client
//!
//! Provides a high-level API for interacting with the `Product` actor.
//! It wraps a `ResourceClient<Product>` and exposes catalog and Stock Ledger methods.
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::{ProductAction, ProductError, StockLevel};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError<ProductError>) -> Self::Error {
        match e {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Like [`ActorClient::get`], with a missing product as an error.
    #[instrument(skip(self))]
    pub async fn require(&self, id: ProductId) -> Result<Product, ProductError> {
        self.get(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))
    }

    /// Check the current stock level for a product.
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<StockLevel, ProductError> {
        debug!("Checking stock");
        self.action(id, ProductAction::CheckStock).await
    }

    /// Atomically decrement stock if at least `quantity` units are left.
    ///
    /// Returns the remaining level, or `InsufficientStock`/`Unavailable`.
    #[instrument(skip(self))]
    pub async fn reserve_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ProductError> {
        debug!("Reserving stock");
        self.action(id, ProductAction::Reserve(quantity)).await
    }

    /// Return previously reserved units.
    #[instrument(skip(self))]
    pub async fn release_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ProductError> {
        debug!("Releasing stock");
        self.action(id, ProductAction::Release(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, id: ProductId, quantity: u32) -> Result<StockLevel, ProductError> {
        debug!("Restocking");
        self.action(id, ProductAction::Restock(quantity)).await
    }

    async fn action(
        &self,
        id: ProductId,
        action: ProductAction,
    ) -> Result<StockLevel, ProductError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::mock::{create_mock_client, expect_action, MockClient};

    #[tokio::test]
    async fn reserve_stock_sends_reserve_action() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);

        let reserve_task =
            tokio::spawn(async move { product_client.reserve_stock(ProductId(1), 5).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, ProductId(1));
        assert_eq!(action, ProductAction::Reserve(5));
        responder.send(Ok(7)).unwrap();

        assert_eq!(reserve_task.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn entity_errors_arrive_unwrapped() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_action(ProductId(1))
            .return_err(FrameworkError::Entity(ProductError::InsufficientStock {
                name: "Kettle".into(),
                requested: 100,
                available: 2,
            }));
        let product_client = ProductClient::new(mock.client());

        let result = product_client.reserve_stock(ProductId(1), 100).await;

        assert!(matches!(
            result,
            Err(ProductError::InsufficientStock { available: 2, .. })
        ));
        mock.verify();
    }

    #[tokio::test]
    async fn missing_product_maps_to_not_found() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_get(ProductId(9)).return_ok(None);
        mock.expect_action(ProductId(9))
            .return_err(FrameworkError::NotFound("product_9".into()));
        let product_client = ProductClient::new(mock.client());

        assert_eq!(
            product_client.require(ProductId(9)).await,
            Err(ProductError::NotFound("product_9".into()))
        );
        assert_eq!(
            product_client.check_stock(ProductId(9)).await,
            Err(ProductError::NotFound("product_9".into()))
        );
        mock.verify();
    }

    #[tokio::test]
    async fn closed_actor_is_a_communication_error() {
        let (client, receiver) = create_mock_client::<Product>(1);
        drop(receiver);
        let product_client = ProductClient::new(client);

        let result = product_client.check_stock(ProductId(1)).await;
        assert!(matches!(result, Err(ProductError::ActorCommunicationError(_))));
    }
}
