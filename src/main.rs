use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::{
    api::ApiClient,
    config::AppConfig,
    feed::{ProductFeed, QueryKey},
    filters::{self, ProductFilters, SortOption},
    storage::{FileStorage, MemoryStorage, SharedStorage},
    store::AppStore,
};

// Smoke tool: runs a short browse session against the live remote API and
// logs what the store ends up with. An optional search term comes from argv.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let storage: SharedStorage = match &config.storage_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using file-backed client storage");
            Arc::new(FileStorage::open(path.clone()))
        }
        None => Arc::new(MemoryStorage::new()),
    };

    let client = Arc::new(ApiClient::new(&config, storage.clone())?);
    let mut store = AppStore::new(storage);
    let feed = ProductFeed::new(client.clone(), store.products(), &config);

    if store.auth.is_authenticated() {
        let valid = store.validate_session(&client).await;
        tracing::info!(valid, "restored session validated");
    }

    let search = std::env::args().nth(1).unwrap_or_default();
    if !search.is_empty() {
        store.set_search_query(search.clone());
        feed.set_query(QueryKey::search(search)).await?;
    } else {
        feed.refresh().await?;
    }
    feed.load_more().await?;

    {
        let products = store.products();
        let state = products.lock().unwrap();
        tracing::info!(
            fetched = state.items.len(),
            total = state.total,
            has_more = state.has_more(),
            "window after one load-more"
        );

        let filters_active = ProductFilters {
            min_rating: Some(4.0),
            in_stock: Some(true),
            ..Default::default()
        };
        let view =
            filters::apply_filters_and_sort(&state.items, &filters_active, SortOption::PriceAsc);
        tracing::info!(
            matching = view.len(),
            brands = ?filters::unique_brands(&state.items),
            bounds = ?filters::price_bounds(&state.items),
            "derived view: rating >= 4, in stock, cheapest first"
        );

        if let Some(first) = view.first() {
            store.cart.add_one(first);
            tracing::info!(
                title = %first.title,
                cart_items = store.cart.total_quantity(),
                subtotal = store.cart.subtotal(),
                "added cheapest match to cart"
            );
        }
    }

    let categories = client.fetch_categories().await?;
    tracing::info!(count = categories.len(), "categories fetched");

    Ok(())
}
