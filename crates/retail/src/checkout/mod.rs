//! # Checkout Orchestrator
//!
//! Turns a customer's cart into an order. [`CheckoutService`] holds clients only; every
//! piece of state it touches lives in an actor.
//!
//! ## Commit sequence
//!
//! 1. Claim the cart inside the cart actor. A second checkout of the same cart fails here,
//!    and the customer cannot edit the cart until the claim is gone.
//! 2. Re-validate each line against the live catalog and price it with live prices.
//! 3. Reserve stock line by line. Each reservation is one conditional decrement inside the
//!    product actor. If any fails, every reservation already made in this call is released.
//! 4. Create the order under a fresh order number, drawing a new number on collision. If
//!    creation fails for any other reason, all reservations are released.
//! 5. Empty the claimed cart, then update the customer's counters. The order exists by now,
//!    so failures here are logged and do not undo it.
//!
//! Any failure in steps 2 to 4 gives the cart back untouched. Steps 1 to 5 run in a task of
//! their own: a caller that stops waiting (a request timeout) cannot strand reserved stock
//! or a claimed cart halfway through.

pub mod error;
pub mod order_number;

pub use error::CheckoutError;

use crate::cart_actor::CartError;
use crate::clients::{CartClient, CustomerClient, OrderClient, ProductClient};
use crate::model::{
    Address, Cart, CartItem, CustomerId, Order, OrderCreate, OrderItem, PaymentMethod, Product,
    ProductId, ProductSnapshot,
};
use crate::order_actor::OrderError;
use crate::pricing::{PricedLine, PricingPolicy, Quote};
use actor_framework::ActorClient;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn, Instrument, Span};

/// One priced line of a checkout preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// What the customer would be charged right now. Nothing is reserved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutPreview {
    pub customer: CustomerId,
    pub lines: Vec<PreviewLine>,
    pub coupon: Option<String>,
    pub totals: Quote,
}

/// Input to [`CheckoutService::place_order`].
#[derive(Debug, Clone, Default)]
pub struct PlaceOrder {
    /// Required.
    pub shipping_address: Option<Address>,
    /// Defaults to the shipping address.
    pub billing_address: Option<Address>,
    /// Required.
    pub payment_method: Option<PaymentMethod>,
    /// Replaces the cart's coupon when given.
    pub coupon: Option<String>,
    pub notes: Option<String>,
}

/// The validated parts of a [`PlaceOrder`] request.
struct OrderDraft {
    shipping_address: Address,
    billing_address: Address,
    payment_method: PaymentMethod,
    coupon: Option<String>,
    notes: Option<String>,
}

/// A cart line checked against the live catalog.
struct ValidatedLine {
    item: CartItem,
    product: Product,
}

impl ValidatedLine {
    fn priced(&self) -> PricedLine {
        PricedLine::new(self.product.unit_price, self.item.quantity)
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    carts: CartClient,
    products: ProductClient,
    orders: OrderClient,
    customers: CustomerClient,
    pricing: Arc<PricingPolicy>,
    order_number_attempts: u32,
}

impl CheckoutService {
    pub fn new(
        carts: CartClient,
        products: ProductClient,
        orders: OrderClient,
        customers: CustomerClient,
        pricing: Arc<PricingPolicy>,
        order_number_attempts: u32,
    ) -> Self {
        Self {
            carts,
            products,
            orders,
            customers,
            pricing,
            order_number_attempts: order_number_attempts.max(1),
        }
    }

    /// Prices the cart against live stock and prices without changing anything.
    #[instrument(skip(self))]
    pub async fn initiate(&self, customer: CustomerId) -> Result<CheckoutPreview, CheckoutError> {
        let cart = self.load_cart(customer).await?;
        let lines = self.validate_lines(&cart).await?;
        let totals = self.quote(&lines, cart.coupon.as_deref())?;

        Ok(CheckoutPreview {
            customer,
            lines: lines
                .iter()
                .map(|line| PreviewLine {
                    product_id: line.item.product_id,
                    name: line.product.name.clone(),
                    quantity: line.item.quantity,
                    unit_price: line.product.unit_price,
                    line_total: line.priced().total(),
                })
                .collect(),
            coupon: cart.coupon,
            totals,
        })
    }

    /// Places an order for everything in the customer's cart.
    ///
    /// Either the order exists and its stock is committed, or neither happened.
    #[instrument(skip(self, request))]
    pub async fn place_order(
        &self,
        customer: CustomerId,
        request: PlaceOrder,
    ) -> Result<Order, CheckoutError> {
        let shipping_address = request
            .shipping_address
            .ok_or(CheckoutError::MissingField("shipping_address"))?;
        let payment_method = request
            .payment_method
            .ok_or(CheckoutError::MissingField("payment_method"))?;
        let billing_address = request
            .billing_address
            .unwrap_or_else(|| shipping_address.clone());
        check_address("shipping", &shipping_address)?;
        check_address("billing", &billing_address)?;
        let coupon = match request.coupon.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(self.pricing.validate_coupon(code)?),
            _ => None,
        };

        let draft = OrderDraft {
            shipping_address,
            billing_address,
            payment_method,
            coupon,
            notes: request.notes,
        };
        let service = self.clone();
        tokio::spawn(async move { service.commit(customer, draft).await }.instrument(Span::current()))
            .await
            .map_err(|e| CheckoutError::Interrupted(e.to_string()))?
    }

    async fn commit(&self, customer: CustomerId, draft: OrderDraft) -> Result<Order, CheckoutError> {
        let cart = self.claim_cart(customer).await?;

        let order = match self.place_claimed(customer, &cart, draft).await {
            Ok(order) => order,
            Err(e) => {
                if let Err(release) = self.carts.abort_checkout(customer).await {
                    error!(%customer, error = %release, "Cart claim not released");
                }
                return Err(e);
            }
        };

        if let Err(e) = self.carts.complete_checkout(customer).await {
            warn!(%customer, order_number = %order.order_number, error = %e, "Cart not emptied after order");
        }
        if let Err(e) = self
            .customers
            .record_purchase(customer, order.order_number.clone(), order.total())
            .await
        {
            warn!(%customer, order_number = %order.order_number, error = %e, "Customer counters not updated");
        }

        info!(order_number = %order.order_number, total = %order.total(), status = %order.status, "Order placed");
        Ok(order)
    }

    async fn claim_cart(&self, customer: CustomerId) -> Result<Cart, CheckoutError> {
        match self.carts.begin_checkout(customer).await {
            Ok(cart) => Ok(cart),
            Err(CartError::EmptyCart | CartError::CartNotFound(_)) => Err(CheckoutError::EmptyCart),
            Err(e) => Err(e.into()),
        }
    }

    /// Reserves stock and creates the order for a claimed cart.
    async fn place_claimed(
        &self,
        customer: CustomerId,
        cart: &Cart,
        draft: OrderDraft,
    ) -> Result<Order, CheckoutError> {
        let coupon = draft.coupon.or_else(|| cart.coupon.clone());

        // Second validation: stock may have moved since the preview.
        let lines = self.validate_lines(cart).await?;
        let totals = self.quote(&lines, coupon.as_deref())?;
        let items = lines.iter().map(snapshot).collect();

        let reserved = self.reserve_all(&lines).await?;

        let params = OrderCreate {
            order_number: order_number::generate(Utc::now().date_naive()),
            customer,
            items,
            coupon,
            totals,
            payment_method: draft.payment_method,
            shipping_address: draft.shipping_address,
            billing_address: draft.billing_address,
            notes: draft.notes,
        };
        match self.create_with_fresh_number(params).await {
            Ok(order) => Ok(order),
            Err(e) => {
                warn!(%customer, error = %e, "Order creation failed, releasing stock");
                self.release_all(&reserved).await;
                Err(e)
            }
        }
    }

    async fn load_cart(&self, customer: CustomerId) -> Result<Cart, CheckoutError> {
        let cart = self.carts.get_cart(customer).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(cart)
    }

    /// Fails on the first line that cannot be supplied, naming the product.
    async fn validate_lines(&self, cart: &Cart) -> Result<Vec<ValidatedLine>, CheckoutError> {
        let mut lines = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = self
                .products
                .get(item.product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(item.product_id.to_string()))?;

            if !product.is_available {
                return Err(CheckoutError::ProductUnavailable { name: product.name });
            }
            if !product.accepts_quantity(item.quantity) {
                return Err(CheckoutError::QuantityOutOfRange {
                    name: product.name,
                    quantity: item.quantity,
                    min: product.min_order_quantity,
                    max: product.max_order_quantity,
                });
            }
            if product.available_quantity < item.quantity {
                return Err(CheckoutError::InsufficientStock {
                    name: product.name,
                    requested: item.quantity,
                    available: product.available_quantity,
                });
            }
            lines.push(ValidatedLine {
                item: item.clone(),
                product,
            });
        }
        Ok(lines)
    }

    fn quote(&self, lines: &[ValidatedLine], coupon: Option<&str>) -> Result<Quote, CheckoutError> {
        let priced: Vec<PricedLine> = lines.iter().map(ValidatedLine::priced).collect();
        Ok(self.pricing.quote(&priced, coupon)?)
    }

    /// Reserves every line or none of them.
    async fn reserve_all(
        &self,
        lines: &[ValidatedLine],
    ) -> Result<Vec<(ProductId, u32)>, CheckoutError> {
        let mut reserved = Vec::with_capacity(lines.len());
        for line in lines {
            let (id, quantity) = (line.item.product_id, line.item.quantity);
            match self.products.reserve_stock(id, quantity).await {
                Ok(_) => reserved.push((id, quantity)),
                Err(e) => {
                    warn!(product = %id, quantity, error = %e, rolled_back = reserved.len(), "Reservation failed, rolling back");
                    self.release_all(&reserved).await;
                    return Err(e.into());
                }
            }
        }
        Ok(reserved)
    }

    async fn release_all(&self, reserved: &[(ProductId, u32)]) {
        for &(id, quantity) in reserved {
            if let Err(e) = self.products.release_stock(id, quantity).await {
                error!(product = %id, quantity, error = %e, "Compensating release failed");
            }
        }
    }

    async fn create_with_fresh_number(&self, mut params: OrderCreate) -> Result<Order, CheckoutError> {
        for attempt in 1..=self.order_number_attempts {
            match self.orders.create_order(params.clone()).await {
                Ok(order) => return Ok(order),
                Err(OrderError::DuplicateOrderNumber(taken)) => {
                    warn!(attempt, order_number = %taken, "Order number collision, regenerating");
                    params.order_number = order_number::generate(Utc::now().date_naive());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(CheckoutError::OrderNumberExhausted(self.order_number_attempts))
    }
}

fn check_address(which: &'static str, address: &Address) -> Result<(), CheckoutError> {
    let missing = address.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CheckoutError::InvalidAddress {
            which,
            fields: missing.join(", "),
        })
    }
}

/// Captures the live price and display data into an order line.
fn snapshot(line: &ValidatedLine) -> OrderItem {
    OrderItem {
        product_id: line.item.product_id,
        quantity: line.item.quantity,
        unit_price: line.product.unit_price,
        line_total: line.priced().total(),
        snapshot: ProductSnapshot {
            name: line.product.name.clone(),
            color: line.product.color.clone(),
            brand: line.product.brand.clone(),
            thumbnail: line.product.thumbnail.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Classify, ErrorKind};
    use crate::model::{Customer, OrderNumber, OrderStatus, PaymentStatus};
    use crate::product_actor::ProductError;
    use actor_framework::mock::{create_mock_client, expect_create, MockClient};
    use actor_framework::FrameworkError;
    use std::time::Duration;

    fn address() -> Address {
        Address {
            full_name: "Asha Rao".into(),
            line1: "12 MG Road".into(),
            line2: None,
            city: "Pune".into(),
            state: "MH".into(),
            postal_code: "411001".into(),
            country: "IN".into(),
            phone: None,
        }
    }

    fn product(id: u64, name: &str, price: i64, stock: u32) -> Product {
        Product {
            id: ProductId(id),
            name: name.into(),
            unit_price: Decimal::from(price),
            available_quantity: stock,
            min_order_quantity: 1,
            max_order_quantity: 100,
            is_available: true,
            color: None,
            brand: None,
            thumbnail: None,
        }
    }

    fn cart_with(lines: &[(u64, u32)]) -> Cart {
        let mut cart = Cart::empty(CustomerId(1));
        cart.items = lines
            .iter()
            .map(|&(id, quantity)| CartItem {
                product_id: ProductId(id),
                quantity,
                unit_price: Decimal::ZERO,
                line_total: Decimal::ZERO,
            })
            .collect();
        cart
    }

    fn claimed(lines: &[(u64, u32)]) -> Cart {
        let mut cart = cart_with(lines);
        cart.checkout_started_at = Some(Utc::now());
        cart
    }

    struct Mocks {
        carts: MockClient<Cart>,
        products: MockClient<Product>,
        orders: MockClient<Order>,
        customers: MockClient<Customer>,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                carts: MockClient::new(),
                products: MockClient::new(),
                orders: MockClient::new(),
                customers: MockClient::new(),
            }
        }

        fn service(&self) -> CheckoutService {
            CheckoutService::new(
                CartClient::new(self.carts.client()),
                ProductClient::new(self.products.client()),
                OrderClient::new(self.orders.client()),
                CustomerClient::new(self.customers.client()),
                Arc::new(PricingPolicy::default()),
                3,
            )
        }

        fn verify(&self) {
            self.carts.verify();
            self.products.verify();
            self.orders.verify();
            self.customers.verify();
        }
    }

    fn request(method: PaymentMethod) -> PlaceOrder {
        PlaceOrder {
            shipping_address: Some(address()),
            payment_method: Some(method),
            ..PlaceOrder::default()
        }
    }

    fn stored_order(params_total: Decimal, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            order_number: OrderNumber::from("ORD-20261018-ABC123"),
            customer: CustomerId(1),
            items: Vec::new(),
            coupon: None,
            totals: Quote {
                final_amount: params_total,
                ..Quote::default()
            },
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::CashOnDelivery,
            shipping_address: address(),
            billing_address: address(),
            notes: None,
            transaction_id: None,
            tracking: Default::default(),
            cancellation_reason: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn second_reservation_failure_releases_the_first() {
        let mut mocks = Mocks::new();
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(claimed(&[(1, 2), (2, 3)]));
        mocks
            .products
            .expect_get(ProductId(1))
            .return_ok(Some(product(1, "Mug", 10, 5)));
        mocks
            .products
            .expect_get(ProductId(2))
            .return_ok(Some(product(2, "Plate", 20, 5)));
        mocks.products.expect_action(ProductId(1)).return_ok(3);
        mocks
            .products
            .expect_action(ProductId(2))
            .return_err(FrameworkError::Entity(ProductError::InsufficientStock {
                name: "Plate".into(),
                requested: 3,
                available: 1,
            }));
        // The compensating release of the first line, then the cart is handed back.
        mocks.products.expect_action(ProductId(1)).return_ok(5);
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(cart_with(&[(1, 2), (2, 3)]));

        let result = mocks
            .service()
            .place_order(CustomerId(1), request(PaymentMethod::Card))
            .await;

        assert_eq!(
            result,
            Err(CheckoutError::InsufficientStock {
                name: "Plate".into(),
                requested: 3,
                available: 1,
            })
        );
        mocks.verify();
    }

    #[tokio::test]
    async fn order_number_collision_draws_a_new_number() {
        let mut mocks = Mocks::new();
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(claimed(&[(1, 1)]));
        mocks
            .products
            .expect_get(ProductId(1))
            .return_ok(Some(product(1, "Mug", 10, 5)));
        mocks.products.expect_action(ProductId(1)).return_ok(4);
        mocks
            .orders
            .expect_create()
            .return_err(FrameworkError::AlreadyExists("ORD-20261018-TAKEN1".into()));
        mocks
            .orders
            .expect_create()
            .return_ok(stored_order(Decimal::from(61), OrderStatus::Confirmed));
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(Cart::empty(CustomerId(1)));
        mocks.customers.expect_action(CustomerId(1)).return_err(
            FrameworkError::NotFound("customer_1".into()),
        );

        let order = mocks
            .service()
            .place_order(CustomerId(1), request(PaymentMethod::CashOnDelivery))
            .await
            .unwrap();

        // A missing customer record is logged, not fatal.
        assert_eq!(order.order_number, OrderNumber::from("ORD-20261018-ABC123"));
        mocks.verify();
    }

    #[tokio::test]
    async fn exhausted_order_numbers_release_stock() {
        let mut mocks = Mocks::new();
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(claimed(&[(1, 2)]));
        mocks
            .products
            .expect_get(ProductId(1))
            .return_ok(Some(product(1, "Mug", 10, 5)));
        mocks.products.expect_action(ProductId(1)).return_ok(3);
        for _ in 0..3 {
            mocks
                .orders
                .expect_create()
                .return_err(FrameworkError::AlreadyExists("taken".into()));
        }
        mocks.products.expect_action(ProductId(1)).return_ok(5);
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(cart_with(&[(1, 2)]));

        let result = mocks
            .service()
            .place_order(CustomerId(1), request(PaymentMethod::Card))
            .await;

        assert_eq!(result, Err(CheckoutError::OrderNumberExhausted(3)));
        mocks.verify();
    }

    #[tokio::test]
    async fn missing_payment_method_fails_before_any_lookup() {
        let mocks = Mocks::new();
        let result = mocks
            .service()
            .place_order(
                CustomerId(1),
                PlaceOrder {
                    shipping_address: Some(address()),
                    ..PlaceOrder::default()
                },
            )
            .await;

        assert_eq!(result, Err(CheckoutError::MissingField("payment_method")));
        mocks.verify();
    }

    #[tokio::test]
    async fn unknown_override_coupon_fails_before_claiming_the_cart() {
        let mocks = Mocks::new();

        let result = mocks
            .service()
            .place_order(
                CustomerId(1),
                PlaceOrder {
                    coupon: Some("HALFOFF".into()),
                    ..request(PaymentMethod::Card)
                },
            )
            .await;

        assert_eq!(result, Err(CheckoutError::InvalidCoupon("HALFOFF".into())));
        mocks.verify();
    }

    #[tokio::test]
    async fn cart_held_by_another_checkout_is_a_conflict() {
        let mut mocks = Mocks::new();
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_err(FrameworkError::Entity(CartError::CheckoutInProgress(
                "customer_1".into(),
            )));

        let result = mocks
            .service()
            .place_order(CustomerId(1), request(PaymentMethod::Card))
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        mocks.verify();
    }

    /// Answers the first order creation after `delay` with `reply`.
    fn slow_orders(
        delay: Duration,
        reply: Result<Order, FrameworkError<OrderError>>,
    ) -> (OrderClient, tokio::task::JoinHandle<()>) {
        let (client, mut receiver) = create_mock_client::<Order>(4);
        let responder = tokio::spawn(async move {
            if let Some((_, respond_to)) = expect_create(&mut receiver).await {
                tokio::time::sleep(delay).await;
                let _ = respond_to.send(reply);
            }
        });
        (OrderClient::new(client), responder)
    }

    fn service_with_orders(mocks: &Mocks, orders: OrderClient) -> CheckoutService {
        CheckoutService::new(
            CartClient::new(mocks.carts.client()),
            ProductClient::new(mocks.products.client()),
            orders,
            CustomerClient::new(mocks.customers.client()),
            Arc::new(PricingPolicy::default()),
            3,
        )
    }

    #[tokio::test]
    async fn abandoned_checkout_still_releases_stock_when_creation_fails() {
        let mut mocks = Mocks::new();
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(claimed(&[(1, 2)]));
        mocks
            .products
            .expect_get(ProductId(1))
            .return_ok(Some(product(1, "Mug", 10, 5)));
        mocks.products.expect_action(ProductId(1)).return_ok(3);
        // Release after the failed create, then the cart is handed back.
        mocks.products.expect_action(ProductId(1)).return_ok(5);
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(cart_with(&[(1, 2)]));
        let (orders, responder) =
            slow_orders(Duration::from_millis(100), Err(FrameworkError::ActorDropped));
        let service = service_with_orders(&mocks, orders);

        let waited = tokio::time::timeout(
            Duration::from_millis(20),
            service.place_order(CustomerId(1), request(PaymentMethod::Card)),
        )
        .await;
        assert!(waited.is_err());

        responder.await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        mocks.verify();
    }

    #[tokio::test]
    async fn abandoned_checkout_still_completes_when_creation_succeeds() {
        let mut mocks = Mocks::new();
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(claimed(&[(1, 2)]));
        mocks
            .products
            .expect_get(ProductId(1))
            .return_ok(Some(product(1, "Mug", 10, 5)));
        mocks.products.expect_action(ProductId(1)).return_ok(3);
        mocks
            .carts
            .expect_action(CustomerId(1))
            .return_ok(Cart::empty(CustomerId(1)));
        mocks
            .customers
            .expect_action(CustomerId(1))
            .return_err(FrameworkError::NotFound("customer_1".into()));
        let (orders, responder) = slow_orders(
            Duration::from_millis(100),
            Ok(stored_order(Decimal::from(94), OrderStatus::Pending)),
        );
        let service = service_with_orders(&mocks, orders);

        let waited = tokio::time::timeout(
            Duration::from_millis(20),
            service.place_order(CustomerId(1), request(PaymentMethod::Card)),
        )
        .await;
        assert!(waited.is_err());

        responder.await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        // No release was sent: the stock stays with the order that now exists.
        mocks.verify();
    }
}
