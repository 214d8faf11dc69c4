//! Locally persisted shopping cart.

use serde::{Deserialize, Serialize};

/// Local storage key holding the cart list.
pub const CART_STORAGE_KEY: &str = "gaia.cart.items";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub concentration: String,
    pub qty: u32,
}

impl CartItem {
    /// A single unit of `product` at `concentration`.
    pub fn new(product_id: &str, title: impl Into<String>, concentration: impl Into<String>) -> Self {
        let concentration = concentration.into();
        Self {
            id: format!("{product_id}-{concentration}"),
            title: title.into(),
            concentration,
            qty: 1,
        }
    }
}

/// Cart contents. Items are appended, never merged by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(Vec<CartItem>);

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: CartItem) {
        self.0.push(item);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_units(&self) -> u32 {
        self.0.iter().map(|i| i.qty).sum()
    }

    /// Parses stored JSON; anything that is not a list of items is an empty cart.
    pub fn from_json(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self(items)
    }
}

impl IntoIterator for Cart {
    type Item = CartItem;
    type IntoIter = std::vec::IntoIter<CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
