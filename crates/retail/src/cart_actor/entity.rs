//! [`ActorEntity`] implementation for [`Cart`].
//!
//! Every action ends with [`Cart::reprice`]: prices are read live from the product actor,
//! the pricing engine runs, and only then does the framework persist the working copy. A
//! failing action therefore leaves the stored cart as it was.
//!
//! A checkout claims the cart with `BeginCheckout` inside the actor loop. While the claim
//! is held every edit is refused, so the items that become the order are exactly the items
//! that `CompleteCheckout` removes.

use super::actions::CartAction;
use super::error::CartError;
use crate::clients::ProductClient;
use crate::model::{Cart, CartCreate, CartItem, CustomerId, Product, ProductId};
use crate::pricing::{PricedLine, PricingError, PricingPolicy};
use actor_framework::{ActorClient, ActorEntity};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

/// Dependencies injected into the Cart actor at `run` time.
#[derive(Clone)]
pub struct CartContext {
    pub products: ProductClient,
    pub pricing: Arc<PricingPolicy>,
}

impl From<PricingError> for CartError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::InvalidCoupon(code) => CartError::InvalidCoupon(code),
        }
    }
}

async fn lookup(ctx: &CartContext, id: ProductId) -> Result<Option<Product>, CartError> {
    ctx.products
        .get(id)
        .await
        .map_err(|e| CartError::Catalog(e.to_string()))
}

async fn require(ctx: &CartContext, id: ProductId) -> Result<Product, CartError> {
    lookup(ctx, id).await?.ok_or(CartError::ProductNotFound(id))
}

/// Bounds, availability and stock for `quantity` units of `product` in one line.
fn check_line(product: &Product, quantity: u32) -> Result<(), CartError> {
    if !product.accepts_quantity(quantity) {
        return Err(CartError::QuantityOutOfRange {
            name: product.name.clone(),
            quantity,
            min: product.min_order_quantity,
            max: product.max_order_quantity,
        });
    }
    if !product.is_available {
        return Err(CartError::ProductUnavailable {
            name: product.name.clone(),
            detail: "not currently sold".into(),
        });
    }
    if product.available_quantity < quantity {
        return Err(CartError::ProductUnavailable {
            name: product.name.clone(),
            detail: format!(
                "requested {quantity}, {} in stock",
                product.available_quantity
            ),
        });
    }
    Ok(())
}

impl Cart {
    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id == product_id)
    }

    async fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        ctx: &CartContext,
    ) -> Result<(), CartError> {
        let product = require(ctx, product_id).await?;
        let in_cart = self.quantity_of(product_id);

        if in_cart == 0 {
            check_line(&product, quantity)?;
            self.items.push(CartItem {
                product_id,
                quantity,
                unit_price: product.unit_price,
                line_total: Decimal::ZERO,
            });
            return Ok(());
        }

        // Merging: the increment itself must be a valid quantity, the sum must fit the max.
        if quantity == 0 {
            return Err(CartError::QuantityOutOfRange {
                name: product.name,
                quantity,
                min: product.min_order_quantity,
                max: product.max_order_quantity,
            });
        }
        let combined = in_cart.saturating_add(quantity);
        if combined > product.max_order_quantity {
            return Err(CartError::MaximumExceeded {
                name: product.name,
                max: product.max_order_quantity,
                in_cart,
            });
        }
        check_line(&product, combined)?;
        if let Some(index) = self.position(product_id) {
            self.items[index].quantity = combined;
        }
        Ok(())
    }

    async fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        ctx: &CartContext,
    ) -> Result<(), CartError> {
        let index = self
            .position(product_id)
            .ok_or(CartError::ItemNotInCart(product_id))?;
        let product = require(ctx, product_id).await?;
        check_line(&product, quantity)?;
        self.items[index].quantity = quantity;
        Ok(())
    }

    fn empty_out(&mut self) {
        self.items.clear();
        self.coupon = None;
    }

    fn remove_item(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let index = self
            .position(product_id)
            .ok_or(CartError::ItemNotInCart(product_id))?;
        self.items.remove(index);
        Ok(())
    }

    /// Recomputes every derived field from live prices.
    ///
    /// Lines whose product has left the catalog are dropped.
    pub(crate) async fn reprice(&mut self, ctx: &CartContext) -> Result<(), CartError> {
        let mut kept = Vec::with_capacity(self.items.len());
        for mut item in std::mem::take(&mut self.items) {
            match lookup(ctx, item.product_id).await? {
                Some(product) => {
                    item.unit_price = product.unit_price;
                    item.line_total = PricedLine::new(product.unit_price, item.quantity).total();
                    kept.push(item);
                }
                None => {
                    warn!(customer = %self.customer, product = %item.product_id, "Dropping vanished product from cart");
                }
            }
        }
        self.items = kept;

        let lines: Vec<PricedLine> = self.items.iter().map(CartItem::priced_line).collect();
        self.totals = ctx.pricing.quote(&lines, self.coupon.as_deref())?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Cart {
    type Id = CustomerId;
    type Create = CartCreate;
    /// Carts change only through actions.
    type Update = ();
    type Action = CartAction;
    type ActionResult = Cart;
    type Context = CartContext;
    type Error = CartError;

    fn assign_id(_sequence: u64, params: &CartCreate) -> CustomerId {
        params.customer
    }

    fn id(&self) -> CustomerId {
        self.customer
    }

    fn from_create_params(id: CustomerId, _params: CartCreate) -> Result<Self, CartError> {
        Ok(Cart::empty(id))
    }

    async fn on_update(&mut self, _update: (), _ctx: &CartContext) -> Result<(), CartError> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CartAction,
        ctx: &CartContext,
    ) -> Result<Cart, CartError> {
        let edits = !matches!(
            action,
            CartAction::Refresh
                | CartAction::BeginCheckout
                | CartAction::CompleteCheckout
                | CartAction::AbortCheckout
        );
        if edits && self.is_checking_out() {
            return Err(CartError::CheckoutInProgress(self.customer.to_string()));
        }

        match action {
            CartAction::AddItem {
                product_id,
                quantity,
            } => self.add_item(product_id, quantity, ctx).await?,
            CartAction::SetQuantity {
                product_id,
                quantity,
            } => self.set_quantity(product_id, quantity, ctx).await?,
            CartAction::RemoveItem { product_id } => self.remove_item(product_id)?,
            CartAction::ApplyCoupon(code) => {
                self.coupon = Some(ctx.pricing.validate_coupon(&code)?);
            }
            CartAction::RemoveCoupon => self.coupon = None,
            CartAction::Refresh => {}
            CartAction::Clear => self.empty_out(),
            CartAction::BeginCheckout => {
                if self.is_checking_out() {
                    return Err(CartError::CheckoutInProgress(self.customer.to_string()));
                }
                if self.is_empty() {
                    return Err(CartError::EmptyCart);
                }
                self.checkout_started_at = Some(Utc::now());
            }
            CartAction::CompleteCheckout => {
                if self.is_checking_out() {
                    self.empty_out();
                    self.checkout_started_at = None;
                } else {
                    warn!(customer = %self.customer, "Completing a checkout that holds no claim");
                }
            }
            CartAction::AbortCheckout => self.checkout_started_at = None,
        }
        self.reprice(ctx).await?;
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::Quote;
    use actor_framework::mock::MockClient;

    fn kettle() -> Product {
        Product {
            id: ProductId(1),
            name: "Kettle".into(),
            unit_price: Decimal::from(100),
            available_quantity: 12,
            min_order_quantity: 1,
            max_order_quantity: 100,
            is_available: true,
            color: None,
            brand: None,
            thumbnail: None,
        }
    }

    fn cart_of_five() -> Cart {
        let mut cart = Cart::empty(CustomerId(1));
        cart.items.push(CartItem {
            product_id: ProductId(1),
            quantity: 5,
            unit_price: Decimal::from(100),
            line_total: Decimal::from(500),
        });
        cart
    }

    fn context(products: &MockClient<Product>) -> CartContext {
        CartContext {
            products: ProductClient::new(products.client()),
            pricing: Arc::new(PricingPolicy::default()),
        }
    }

    #[tokio::test]
    async fn claimed_cart_refuses_a_second_checkout_and_edits() {
        let mut products = MockClient::<Product>::new();
        // Only the claim reprices; refused actions never reach the catalog.
        products.expect_get(ProductId(1)).return_ok(Some(kettle()));
        let ctx = context(&products);
        let mut cart = cart_of_five();

        let claimed = cart
            .handle_action(CartAction::BeginCheckout, &ctx)
            .await
            .unwrap();
        assert!(claimed.is_checking_out());
        assert_eq!(claimed.totals.subtotal, Decimal::from(500));

        let second = cart.handle_action(CartAction::BeginCheckout, &ctx).await;
        assert_eq!(second, Err(CartError::CheckoutInProgress("customer_1".into())));

        let edit = cart
            .handle_action(
                CartAction::AddItem {
                    product_id: ProductId(1),
                    quantity: 1,
                },
                &ctx,
            )
            .await;
        assert!(matches!(edit, Err(CartError::CheckoutInProgress(_))));
        assert_eq!(cart.quantity_of(ProductId(1)), 5);
        products.verify();
    }

    #[tokio::test]
    async fn completion_empties_and_abort_keeps_items() {
        let mut products = MockClient::<Product>::new();
        products.expect_get(ProductId(1)).return_ok(Some(kettle()));
        products.expect_get(ProductId(1)).return_ok(Some(kettle()));
        let ctx = context(&products);

        let mut aborted = cart_of_five();
        aborted.checkout_started_at = Some(Utc::now());
        let released = aborted
            .handle_action(CartAction::AbortCheckout, &ctx)
            .await
            .unwrap();
        assert!(!released.is_checking_out());
        assert_eq!(released.quantity_of(ProductId(1)), 5);

        let mut completed = cart_of_five();
        completed
            .handle_action(CartAction::BeginCheckout, &ctx)
            .await
            .unwrap();
        let emptied = completed
            .handle_action(CartAction::CompleteCheckout, &ctx)
            .await
            .unwrap();
        assert!(emptied.is_empty());
        assert!(!emptied.is_checking_out());
        assert_eq!(emptied.totals, Quote::default());
        products.verify();
    }

    #[tokio::test]
    async fn empty_cart_cannot_be_claimed() {
        let products = MockClient::<Product>::new();
        let mut cart = Cart::empty(CustomerId(1));

        let result = cart
            .handle_action(CartAction::BeginCheckout, &context(&products))
            .await;

        assert_eq!(result, Err(CartError::EmptyCart));
        assert!(!cart.is_checking_out());
    }
}
