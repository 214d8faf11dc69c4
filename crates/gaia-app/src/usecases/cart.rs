use std::sync::Arc;

use gaia_core::cart::{Cart, CartItem, CART_STORAGE_KEY};
use gaia_core::ports::LocalStorePort;
use tracing::{debug, warn};

/// Cart persisted in local storage under a fixed key.
///
/// Reads never fail: missing, unreadable or malformed data is an empty cart.
/// Write failures are logged and dropped.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn LocalStorePort>,
}

impl CartStore {
    pub fn new(store: Arc<dyn LocalStorePort>) -> Self {
        Self { store }
    }

    pub fn read(&self) -> Cart {
        match self.store.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => Cart::from_json(&raw),
            Ok(None) => Cart::new(),
            Err(err) => {
                debug!(error = %err, "cart read failed; using empty cart");
                Cart::new()
            }
        }
    }

    pub fn write(&self, cart: &Cart) {
        let json = match serde_json::to_string(cart) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "cart encode failed");
                return;
            }
        };
        if let Err(err) = self.store.set(CART_STORAGE_KEY, &json) {
            warn!(error = %err, "cart write failed");
        }
    }

    /// Appends one unit of `product_id` at `concentration` and returns the cart.
    pub fn add(&self, product_id: &str, title: &str, concentration: &str) -> Cart {
        let mut cart = self.read();
        cart.add(CartItem::new(product_id, title, concentration));
        self.write(&cart);
        cart
    }

    pub fn clear(&self) {
        self.write(&Cart::new());
    }
}
