//! Shopping cart - per-session, in-memory selection of dishes.
//!
//! A [`Cart`] is owned by whoever drives a customer session; it is never shared or
//! persisted. Lines copy the dish's name, price and image when first added, so later
//! catalog edits do not change what the customer saw. Quantities are always at least 1:
//! dropping a line to zero removes it.

use crate::{
    core::{money, order::NewOrder},
    entities::{CustomerDetails, OrderItem, dish},
    errors::Result,
};
use rust_decimal::Decimal;

/// One line in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Dish id
    pub dish_id: i64,
    /// Dish name when added
    pub name: String,
    /// Unit price when added
    pub price: f64,
    /// Units, always >= 1
    pub quantity: u32,
    /// Dish photo reference when added
    pub image_url: Option<String>,
}

impl CartItem {
    /// `price x quantity` for this line.
    pub fn line_total(&self) -> Result<Decimal> {
        money::line_total(self.price, self.quantity)
    }
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.dish_id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price,
            image_url: item.image_url.clone(),
        }
    }
}

/// Ordered collection of cart lines, at most one per dish.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds one unit of `dish`, creating the line if needed.
    pub fn add(&mut self, dish: &dish::Model) {
        if let Some(item) = self.find_mut(dish.id) {
            item.quantity = item.quantity.saturating_add(1);
            return;
        }
        self.items.push(CartItem {
            dish_id: dish.id,
            name: dish.name.clone(),
            price: dish.price,
            quantity: 1,
            image_url: dish.image_url.clone(),
        });
    }

    /// Removes one unit; the line disappears when its last unit is removed.
    pub fn decrement(&mut self, dish_id: i64) {
        let Some(item) = self.find_mut(dish_id) else {
            return;
        };
        if item.quantity > 1 {
            item.quantity -= 1;
        } else {
            self.remove(dish_id);
        }
    }

    /// Sets the quantity of an existing line. Zero removes the line; unknown dishes are ignored.
    pub fn set_quantity(&mut self, dish_id: i64, quantity: u32) {
        if quantity == 0 {
            self.remove(dish_id);
        } else if let Some(item) = self.find_mut(dish_id) {
            item.quantity = quantity;
        }
    }

    /// Removes the whole line for `dish_id`.
    pub fn remove(&mut self, dish_id: i64) {
        self.items.retain(|item| item.dish_id != dish_id);
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct dishes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price x quantity` over all lines.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if the sum does not fit in a `Decimal`.
    pub fn total(&self) -> Result<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |acc, item| {
            money::checked_add(acc, item.line_total()?)
        })
    }

    /// Snapshot for [`crate::core::order::create_order`]. The cart itself is left intact
    /// so the caller can clear it only once the order is accepted.
    pub fn checkout(&self, customer: CustomerDetails) -> Result<NewOrder> {
        Ok(NewOrder {
            items: self.items.iter().map(OrderItem::from).collect(),
            customer,
            total: money::to_f64(self.total()?),
        })
    }

    fn find_mut(&mut self, dish_id: i64) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.dish_id == dish_id)
    }
}
