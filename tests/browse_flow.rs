use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use storefront_core::{
    config::AppConfig,
    error::AppResult,
    feed::{ProductFeed, ProductSource, QueryKey},
    filters::{self, ProductFilters, SortOption},
    models::{Product, ProductsPage, ThemeMode},
    storage::{MemoryStorage, SharedStorage, Storage, keys},
    store::AppStore,
};

/// Scripted catalog: `total` products, ids starting at 1, prices and brands
/// cycling deterministically.
struct FakeCatalog {
    total: usize,
    calls: AtomicUsize,
}

impl FakeCatalog {
    fn new(total: usize) -> Self {
        Self {
            total,
            calls: AtomicUsize::new(0),
        }
    }
}

fn sample_product(id: i64) -> Product {
    let brands = ["Acme", "Globex", "Initech"];
    Product {
        id,
        title: format!("Gadget {id}"),
        description: "A gadget".to_string(),
        price: (id as f64) * 2.5,
        discount_percentage: 0.0,
        rating: (id % 5) as f64 + 0.5,
        stock: if id % 4 == 0 { 0 } else { 3 },
        brand: brands[(id as usize) % brands.len()].to_string(),
        category: "gadgets".to_string(),
        thumbnail: String::new(),
        images: vec![format!("https://cdn.example/{id}.jpg")],
    }
}

impl ProductSource for FakeCatalog {
    async fn fetch_page(
        &self,
        _query: &QueryKey,
        skip: usize,
        limit: usize,
    ) -> AppResult<ProductsPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let end = (skip + limit).min(self.total);
        let products = (skip..end).map(|i| sample_product(i as i64 + 1)).collect();
        Ok(ProductsPage {
            products,
            total: self.total,
            skip,
            limit,
        })
    }
}

// Full session: browse with infinite scroll, derive a filtered view, put a
// product in the cart, favorite another, then restart from the same storage
// and check everything durable came back.
#[tokio::test]
async fn browse_filter_cart_and_restart_flow() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let config = AppConfig {
        page_size: 10,
        scroll_cooldown_ms: 0,
        ..Default::default()
    };

    let mut store = AppStore::new(storage.clone());
    let feed = ProductFeed::new(FakeCatalog::new(25), store.products(), &config);

    store.set_search_query("phone");
    feed.set_query(QueryKey::search("phone")).await.unwrap();
    feed.load_more().await.unwrap();
    {
        let products = store.products();
        let state = products.lock().unwrap();
        assert_eq!(state.items.len(), 20);
        assert!(state.has_more());
        assert_eq!(state.search_query, "phone");
    }
    feed.load_more().await.unwrap();
    {
        let products = store.products();
        let state = products.lock().unwrap();
        assert_eq!(state.items.len(), 25);
        assert!(!state.has_more());
    }

    // Derived view over the fetched window.
    let (view, brands) = {
        let products = store.products();
        let state = products.lock().unwrap();
        let active = ProductFilters {
            min_rating: Some(3.0),
            in_stock: Some(true),
            ..Default::default()
        };
        (
            filters::apply_filters_and_sort(&state.items, &active, SortOption::PriceAsc),
            filters::unique_brands(&state.items),
        )
    };
    assert!(!view.is_empty());
    assert!(view.iter().all(|p| p.rating >= 3.0 && p.stock > 0));
    assert!(view.windows(2).all(|w| w[0].price <= w[1].price));
    assert_eq!(brands, vec!["Acme", "Globex", "Initech"]);

    // Cart and favorites take snapshots and write through.
    let cheapest = view.first().unwrap().clone();
    store.cart.add_one(&cheapest);
    store.cart.add(&cheapest, 2);
    assert_eq!(store.cart.items().len(), 1);
    assert_eq!(store.cart.quantity_of(cheapest.id), 3);

    let favorite = view.last().unwrap().clone();
    assert!(store.favorites.toggle(&favorite));
    store.theme.set(ThemeMode::Dark);

    drop(store);

    // A fresh session over the same storage rehydrates the shadow state.
    let restarted = AppStore::new(storage.clone());
    assert_eq!(restarted.cart.quantity_of(cheapest.id), 3);
    assert_eq!(restarted.cart.subtotal(), cheapest.price * 3.0);
    assert!(restarted.favorites.is_favorite(favorite.id));
    assert_eq!(restarted.theme.mode(), ThemeMode::Dark);
    // Products are not part of the durable shadow.
    assert!(restarted.products().lock().unwrap().items.is_empty());
}

#[tokio::test]
async fn corrupt_shadow_state_degrades_to_empty() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    storage.set(keys::CART, "][ definitely not json");
    storage.set(keys::FAVORITES, "42");
    storage.set(keys::USER, "{\"id\":");

    let store = AppStore::new(storage.clone());
    assert!(store.cart.is_empty());
    assert_eq!(store.favorites.count(), 0);
    assert!(!store.auth.is_authenticated());
    // The poisoned keys were dropped outright.
    assert!(storage.get(keys::CART).is_none());
    assert!(storage.get(keys::USER).is_none());
}

// Paging run over 25 records with pages of 10: windows of 10, 20, then 25.
#[tokio::test]
async fn paging_run_matches_expected_window_sizes() {
    let config = AppConfig {
        page_size: 10,
        scroll_cooldown_ms: 0,
        ..Default::default()
    };
    let store = AppStore::new(Arc::new(MemoryStorage::new()));
    let feed = ProductFeed::new(FakeCatalog::new(25), store.products(), &config);

    feed.set_query(QueryKey::search("phone")).await.unwrap();
    assert_eq!(store.products().lock().unwrap().items.len(), 10);
    assert!(feed.has_more());

    feed.load_more().await.unwrap();
    assert_eq!(store.products().lock().unwrap().items.len(), 20);
    assert!(feed.has_more());

    feed.load_more().await.unwrap();
    assert_eq!(store.products().lock().unwrap().items.len(), 25);
    assert!(!feed.has_more());
}
