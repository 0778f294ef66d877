//! Application state store.
//!
//! `AppStore` is the single writer of truth for in-memory client state.
//! Persistence is a derived shadow: each slice writes through on mutation
//! and rehydrates exactly once, at construction. Asynchronous operations
//! commit state only at pending/fulfilled/rejected boundaries.

pub mod auth;
pub mod cart;
pub mod favorites;
pub mod products;
pub mod theme;

use std::sync::{Arc, Mutex};

use crate::api::ApiClient;
use crate::dto::auth::LoginCredentials;
use crate::dto::products::{CreateProductPayload, UpdateProductPayload};
use crate::error::AppResult;
use crate::feed::SharedProducts;
use crate::models::{Product, ProductDetail, User};
use crate::storage::SharedStorage;

use auth::AuthState;
use cart::CartState;
use favorites::FavoritesState;
use products::ProductsState;
use theme::ThemeState;

pub struct AppStore {
    products: SharedProducts,
    pub cart: CartState,
    pub favorites: FavoritesState,
    pub auth: AuthState,
    pub theme: ThemeState,
}

impl AppStore {
    /// Build the store, rehydrating every persisted slice from storage.
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            products: Arc::new(Mutex::new(ProductsState::new())),
            cart: CartState::load(storage.clone()),
            favorites: FavoritesState::load(storage.clone()),
            auth: AuthState::load(storage.clone()),
            theme: ThemeState::load(storage),
        }
    }

    /// Handle to the products slice, shared with the pagination feed.
    pub fn products(&self) -> SharedProducts {
        Arc::clone(&self.products)
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.products.lock().unwrap().set_search_query(query);
    }

    pub fn clear_current_product(&self) {
        self.products.lock().unwrap().clear_current_product();
    }

    /// Load a product detail into `current_product`.
    pub async fn fetch_product(&self, client: &ApiClient, id: i64) -> AppResult<ProductDetail> {
        self.products.lock().unwrap().detail_pending();
        match client.fetch_product(id).await {
            Ok(detail) => {
                self.products
                    .lock()
                    .unwrap()
                    .detail_fulfilled(detail.clone());
                Ok(detail)
            }
            Err(err) => {
                self.products.lock().unwrap().detail_rejected(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn create_product(
        &self,
        client: &ApiClient,
        payload: &CreateProductPayload,
    ) -> AppResult<Product> {
        let detail = client.create_product(payload).await?;
        let product = detail.product;
        self.products.lock().unwrap().created(product.clone());
        tracing::info!(product_id = product.id, "product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        client: &ApiClient,
        id: i64,
        payload: &UpdateProductPayload,
    ) -> AppResult<Product> {
        let detail = client.update_product(id, payload).await?;
        let product = detail.product;
        self.products.lock().unwrap().updated(product.clone());
        tracing::info!(product_id = product.id, "product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, client: &ApiClient, id: i64) -> AppResult<()> {
        client.delete_product(id).await?;
        self.products.lock().unwrap().deleted(id);
        tracing::info!(product_id = id, "product deleted");
        Ok(())
    }

    /// Authenticate and commit the session. Profile and token land together
    /// on success; a rejection leaves the store unauthenticated with the
    /// error message in the auth slice.
    pub async fn login(
        &mut self,
        client: &ApiClient,
        credentials: &LoginCredentials,
    ) -> AppResult<User> {
        self.auth.login_pending();
        match client.login(credentials).await {
            Ok(response) => {
                let user = response.user;
                self.auth
                    .login_fulfilled(user.clone(), credentials.expires_in_mins);
                tracing::info!(username = %user.username, "logged in");
                Ok(user)
            }
            Err(err) => {
                self.auth.login_rejected(err.to_string());
                Err(err)
            }
        }
    }

    /// Settle an optimistic session against `/auth/me`. Returns whether the
    /// session survived; a failure drops profile and token.
    pub async fn validate_session(&mut self, client: &ApiClient) -> bool {
        if !self.auth.is_authenticated() {
            return false;
        }
        match client.current_user().await {
            Ok(response) => {
                self.auth.validate_fulfilled(response.user);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "session validation failed");
                self.auth.validate_rejected();
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        tracing::info!("logged out");
    }
}
