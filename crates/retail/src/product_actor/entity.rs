//! [`ActorEntity`] implementation for [`Product`].
//!
//! Products take their key from the actor's sequence (`product_1`, `product_2`, …). The
//! catalog side (price, bounds, display data) changes through `on_update`; the quantity
//! changes only through [`ProductAction`].

use super::actions::{ProductAction, StockLevel};
use super::error::ProductError;
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;

impl Product {
    fn check_definition(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::InvalidDefinition("name is blank".into()));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(ProductError::InvalidDefinition(format!(
                "{} has a negative price",
                self.name
            )));
        }
        if self.min_order_quantity == 0 || self.min_order_quantity > self.max_order_quantity {
            return Err(ProductError::InvalidDefinition(format!(
                "{} has order bounds {}..={}",
                self.name, self.min_order_quantity, self.max_order_quantity
            )));
        }
        Ok(())
    }

    fn add_units(&mut self, n: u32) -> Result<StockLevel, ProductError> {
        self.available_quantity = self
            .available_quantity
            .checked_add(n)
            .ok_or(ProductError::InvalidQuantity(n))?;
        Ok(self.available_quantity)
    }
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = StockLevel;
    type Context = ();
    type Error = ProductError;

    fn assign_id(sequence: u64, _params: &ProductCreate) -> ProductId {
        ProductId(sequence)
    }

    fn id(&self) -> ProductId {
        self.id
    }

    fn sequence(&self) -> Option<u64> {
        Some(self.id.0)
    }

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, ProductError> {
        let product = Self {
            id,
            name: params.name,
            unit_price: params.unit_price,
            available_quantity: params.available_quantity,
            min_order_quantity: params.min_order_quantity,
            max_order_quantity: params.max_order_quantity,
            is_available: params.is_available,
            color: params.color,
            brand: params.brand,
            thumbnail: params.thumbnail,
        };
        product.check_definition()?;
        Ok(product)
    }

    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), ProductError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(price) = update.unit_price {
            self.unit_price = price;
        }
        if let Some(min) = update.min_order_quantity {
            self.min_order_quantity = min;
        }
        if let Some(max) = update.max_order_quantity {
            self.max_order_quantity = max;
        }
        if let Some(is_available) = update.is_available {
            self.is_available = is_available;
        }
        if let Some(color) = update.color {
            self.color = Some(color);
        }
        if let Some(brand) = update.brand {
            self.brand = Some(brand);
        }
        if let Some(thumbnail) = update.thumbnail {
            self.thumbnail = Some(thumbnail);
        }
        // Runs on a working copy, so a rejected update leaves the stored product as it was.
        self.check_definition()
    }

    /// # Actions
    /// - `CheckStock`: current level
    /// - `Reserve(n)`: conditional decrement
    /// - `Release(n)` / `Restock(n)`: increment
    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &(),
    ) -> Result<StockLevel, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(self.available_quantity),
            ProductAction::Reserve(0) => Err(ProductError::InvalidQuantity(0)),
            ProductAction::Reserve(n) => {
                if !self.is_available {
                    return Err(ProductError::Unavailable {
                        name: self.name.clone(),
                    });
                }
                if self.available_quantity < n {
                    return Err(ProductError::InsufficientStock {
                        name: self.name.clone(),
                        requested: n,
                        available: self.available_quantity,
                    });
                }
                self.available_quantity -= n;
                Ok(self.available_quantity)
            }
            ProductAction::Release(n) | ProductAction::Restock(n) => self.add_units(n),
        }
    }
}
