use crate::models::Product;
use crate::storage::{SharedStorage, keys, read_json, write_json};

/// Favorite products: binary presence keyed by product id, snapshot copies,
/// written through to storage like the cart.
pub struct FavoritesState {
    items: Vec<Product>,
    storage: SharedStorage,
}

impl FavoritesState {
    pub fn load(storage: SharedStorage) -> Self {
        let items = read_json(storage.as_ref(), keys::FAVORITES).unwrap_or_default();
        Self { items, storage }
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_favorite(&self, product_id: i64) -> bool {
        self.items.iter().any(|p| p.id == product_id)
    }

    pub fn add(&mut self, product: &Product) {
        if !self.is_favorite(product.id) {
            self.items.push(product.clone());
            self.persist();
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|p| p.id != product_id);
        self.persist();
    }

    /// Flip presence; returns whether the product is a favorite afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        let added = match self.items.iter().position(|p| p.id == product.id) {
            Some(index) => {
                self.items.remove(index);
                false
            }
            None => {
                self.items.push(product.clone());
                true
            }
        };
        self.persist();
        added
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    fn persist(&self) {
        write_json(self.storage.as_ref(), keys::FAVORITES, &self.items);
    }
}
