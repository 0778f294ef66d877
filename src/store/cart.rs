use crate::models::{CartItem, Product};
use crate::storage::{SharedStorage, keys, read_json, write_json};

/// Client-side cart. At most one entry per product id; entries hold a
/// snapshot of the product taken when it was first added. Every mutation
/// writes the full cart through to storage.
pub struct CartState {
    items: Vec<CartItem>,
    storage: SharedStorage,
}

impl CartState {
    /// Rehydrate from storage; corrupt data comes back as an empty cart.
    pub fn load(storage: SharedStorage) -> Self {
        let items = read_json(storage.as_ref(), keys::CART).unwrap_or_default();
        Self { items, storage }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all entries.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.product.price * f64::from(item.quantity))
            .sum()
    }

    pub fn quantity_of(&self, product_id: i64) -> u32 {
        self.items
            .iter()
            .find(|item| item.product.id == product_id)
            .map(|item| item.quantity)
            .unwrap_or(0)
    }

    /// Add `quantity` units. An existing entry is incremented; a new entry
    /// snapshots the product. Zero quantity is a no-op (UI guard).
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem {
                product: product.clone(),
                quantity,
            }),
        }
        self.persist();
    }

    pub fn add_one(&mut self, product: &Product) {
        self.add(product, 1);
    }

    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|item| item.product.id != product_id);
        self.persist();
    }

    /// Set an entry's quantity; zero removes it. Unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: i64, quantity: u32) {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.product.id == product_id)
        else {
            return;
        };
        if quantity == 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity;
        }
        self.persist();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    fn persist(&self) {
        write_json(self.storage.as_ref(), keys::CART, &self.items);
    }
}
