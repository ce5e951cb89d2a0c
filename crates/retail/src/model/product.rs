/// Represents a product in the catalog, together with its Stock Ledger entry.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`impl ActorEntity for Product`](#impl-ActorEntity-for-Product) for details on:
/// - Creation parameters ([`ProductCreate`])
/// - Update parameters ([`ProductUpdate`])
/// - Custom actions ([`ProductAction`](crate::product_actor::ProductAction))
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const DEFAULT_MIN_ORDER_QUANTITY: u32 = 1;
pub const DEFAULT_MAX_ORDER_QUANTITY: u32 = 100;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    /// Owned by the Stock Ledger; changes only through product actions.
    pub available_quantity: u32,
    pub min_order_quantity: u32,
    pub max_order_quantity: u32,
    pub is_available: bool,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub thumbnail: Option<String>,
}

impl Product {
    /// Whether `quantity` lies within this product's orderable bounds.
    pub fn accepts_quantity(&self, quantity: u32) -> bool {
        quantity > 0 && (self.min_order_quantity..=self.max_order_quantity).contains(&quantity)
    }

    /// Listed and with at least `quantity` units on hand.
    pub fn can_supply(&self, quantity: u32) -> bool {
        self.is_available && self.available_quantity >= quantity
    }
}

/// Payload for adding a product to the catalog.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub unit_price: Decimal,
    pub available_quantity: u32,
    pub min_order_quantity: u32,
    pub max_order_quantity: u32,
    pub is_available: bool,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub thumbnail: Option<String>,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, unit_price: Decimal, available_quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            available_quantity,
            min_order_quantity: DEFAULT_MIN_ORDER_QUANTITY,
            max_order_quantity: DEFAULT_MAX_ORDER_QUANTITY,
            is_available: true,
            color: None,
            brand: None,
            thumbnail: None,
        }
    }

    pub fn order_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_order_quantity = min;
        self.max_order_quantity = max;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// Catalog-side changes. There is no quantity field: stock moves only through `Reserve`,
/// `Release` and `Restock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub min_order_quantity: Option<u32>,
    pub max_order_quantity: Option<u32>,
    pub is_available: Option<bool>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub thumbnail: Option<String>,
}

impl ProductUpdate {
    pub fn price(unit_price: Decimal) -> Self {
        Self {
            unit_price: Some(unit_price),
            ..Self::default()
        }
    }

    pub fn availability(is_available: bool) -> Self {
        Self {
            is_available: Some(is_available),
            ..Self::default()
        }
    }
}
