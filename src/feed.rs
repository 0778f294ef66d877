//! Infinite-scroll pagination controller.
//!
//! Drives the product window for one query key at a time. Invariants:
//! at most one fetch in flight per feed, pages append in request order,
//! changing the query key atomically resets the window and invalidates any
//! in-flight continuation, and scroll-driven triggers are suppressed for a
//! cool-down window after each fetch completes so a burst of proximity
//! events cannot load the same page twice.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::models::ProductsPage;
use crate::store::products::ProductsState;

/// The `(search, category)` pair that scopes a pagination window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryKey {
    pub search: String,
    pub category: String,
}

impl QueryKey {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            category: String::new(),
        }
    }

    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            search: String::new(),
            category: slug.into(),
        }
    }
}

/// Fetch seam for the feed; implemented by the API client and by scripted
/// fakes in tests.
#[allow(async_fn_in_trait)]
pub trait ProductSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &QueryKey,
        skip: usize,
        limit: usize,
    ) -> AppResult<ProductsPage>;
}

impl<S: ProductSource> ProductSource for Arc<S> {
    async fn fetch_page(
        &self,
        query: &QueryKey,
        skip: usize,
        limit: usize,
    ) -> AppResult<ProductsPage> {
        (**self).fetch_page(query, skip, limit).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Fetching,
    FetchingMore,
    Error,
}

/// What a load attempt did; the guards make most of these no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and committed.
    Loaded,
    /// The window already covers the total; nothing to fetch.
    Exhausted,
    /// Another fetch is in flight; trigger ignored.
    AlreadyFetching,
    /// Proximity signal arrived inside the cool-down window; ignored.
    CoolingDown,
    /// The query key changed while the fetch was in flight; result discarded.
    Stale,
    /// The requested key is already current; nothing to do.
    Unchanged,
}

pub type SharedProducts = Arc<Mutex<ProductsState>>;

pub struct ProductFeed<S> {
    source: S,
    products: SharedProducts,
    limit: usize,
    cooldown: Duration,
    ctl: Mutex<FeedCtl>,
}

struct FeedCtl {
    query: QueryKey,
    generation: u64,
    phase: FeedPhase,
    in_flight: bool,
    cooldown_until: Option<Instant>,
}

struct Ticket {
    generation: u64,
    query: QueryKey,
    skip: usize,
    reset: bool,
}

impl<S: ProductSource> ProductFeed<S> {
    pub fn new(source: S, products: SharedProducts, config: &AppConfig) -> Self {
        Self {
            source,
            products,
            limit: config.page_size,
            cooldown: Duration::from_millis(config.scroll_cooldown_ms),
            ctl: Mutex::new(FeedCtl {
                query: QueryKey::default(),
                generation: 0,
                phase: FeedPhase::Idle,
                in_flight: false,
                cooldown_until: None,
            }),
        }
    }

    pub fn query(&self) -> QueryKey {
        self.ctl.lock().unwrap().query.clone()
    }

    pub fn phase(&self) -> FeedPhase {
        self.ctl.lock().unwrap().phase
    }

    pub fn has_more(&self) -> bool {
        self.products.lock().unwrap().has_more()
    }

    pub fn products(&self) -> SharedProducts {
        Arc::clone(&self.products)
    }

    /// Switch to a new query key. Resets the window atomically: any
    /// in-flight continuation is invalidated, items are cleared, the offset
    /// returns to zero, and page one is fetched. A no-op when the key is
    /// already current.
    pub async fn set_query(&self, query: QueryKey) -> AppResult<LoadOutcome> {
        let ticket = {
            let mut ctl = self.ctl.lock().unwrap();
            if ctl.query == query {
                return Ok(LoadOutcome::Unchanged);
            }
            ctl.query = query;
            self.begin_reset(&mut ctl)
        };
        self.run_fetch(ticket).await
    }

    /// Re-fetch page one of the current key, discarding the window.
    pub async fn refresh(&self) -> AppResult<LoadOutcome> {
        let ticket = {
            let mut ctl = self.ctl.lock().unwrap();
            self.begin_reset(&mut ctl)
        };
        self.run_fetch(ticket).await
    }

    /// Explicit load-more. No-ops when exhausted or when a fetch is already
    /// pending; the cool-down only gates scroll-driven triggers.
    pub async fn load_more(&self) -> AppResult<LoadOutcome> {
        let ticket = {
            let mut ctl = self.ctl.lock().unwrap();
            if ctl.in_flight {
                return Ok(LoadOutcome::AlreadyFetching);
            }
            match self.begin_next_page(&mut ctl) {
                Some(ticket) => ticket,
                None => return Ok(LoadOutcome::Exhausted),
            }
        };
        self.run_fetch(ticket).await
    }

    /// Scroll proximity signal. Like [`load_more`](Self::load_more) but also
    /// ignored while the cool-down window is armed.
    pub async fn poke(&self) -> AppResult<LoadOutcome> {
        let ticket = {
            let mut ctl = self.ctl.lock().unwrap();
            if ctl.in_flight {
                return Ok(LoadOutcome::AlreadyFetching);
            }
            if let Some(until) = ctl.cooldown_until {
                if Instant::now() < until {
                    return Ok(LoadOutcome::CoolingDown);
                }
            }
            match self.begin_next_page(&mut ctl) {
                Some(ticket) => ticket,
                None => return Ok(LoadOutcome::Exhausted),
            }
        };
        self.run_fetch(ticket).await
    }

    /// Recover from `Error` by re-issuing the same fetch parameters: page
    /// one when the window is empty, the next page otherwise.
    pub async fn retry(&self) -> AppResult<LoadOutcome> {
        let window_empty = self.products.lock().unwrap().items.is_empty();
        if window_empty {
            self.refresh().await
        } else {
            self.load_more().await
        }
    }

    // Invalidate whatever is in flight and start over at offset zero.
    fn begin_reset(&self, ctl: &mut FeedCtl) -> Ticket {
        ctl.generation += 1;
        ctl.in_flight = true;
        ctl.phase = FeedPhase::Fetching;
        self.products.lock().unwrap().reset_window();
        Ticket {
            generation: ctl.generation,
            query: ctl.query.clone(),
            skip: 0,
            reset: true,
        }
    }

    fn begin_next_page(&self, ctl: &mut FeedCtl) -> Option<Ticket> {
        let skip = {
            let products = self.products.lock().unwrap();
            if !products.has_more() {
                return None;
            }
            products.skip + products.limit
        };
        ctl.in_flight = true;
        ctl.phase = FeedPhase::FetchingMore;
        Some(Ticket {
            generation: ctl.generation,
            query: ctl.query.clone(),
            skip,
            reset: false,
        })
    }

    async fn run_fetch(&self, ticket: Ticket) -> AppResult<LoadOutcome> {
        let result = self
            .source
            .fetch_page(&ticket.query, ticket.skip, self.limit)
            .await;

        let mut ctl = self.ctl.lock().unwrap();
        if ctl.generation != ticket.generation {
            // The key changed while we were away; a newer fetch owns the
            // window now.
            tracing::debug!(skip = ticket.skip, "discarding stale page response");
            return Ok(LoadOutcome::Stale);
        }
        ctl.in_flight = false;
        ctl.cooldown_until = Some(Instant::now() + self.cooldown);
        match result {
            Ok(page) => {
                ctl.phase = FeedPhase::Idle;
                drop(ctl);
                self.products
                    .lock()
                    .unwrap()
                    .fetch_fulfilled(page, ticket.reset);
                Ok(LoadOutcome::Loaded)
            }
            Err(err) => {
                ctl.phase = FeedPhase::Error;
                drop(ctl);
                self.products
                    .lock()
                    .unwrap()
                    .fetch_rejected(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::Product;

    fn product(id: i64) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            description: String::new(),
            price: 1.0,
            discount_percentage: 0.0,
            rating: 0.0,
            stock: 1,
            brand: String::new(),
            category: String::new(),
            thumbnail: String::new(),
            images: Vec::new(),
        }
    }

    /// Serves `total` sequentially-numbered products, optionally delayed;
    /// search "fail" simulates a transport error. Products for a search
    /// query get ids offset by 1000 so windows are distinguishable.
    struct FakeSource {
        total: usize,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(total: usize) -> Self {
            Self {
                total,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(total: usize, delay: Duration) -> Self {
            Self {
                total,
                delay,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProductSource for &FakeSource {
        async fn fetch_page(
            &self,
            query: &QueryKey,
            skip: usize,
            limit: usize,
        ) -> AppResult<ProductsPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if query.search == "fail" {
                return Err(crate::error::AppError::Internal(anyhow::anyhow!(
                    "fetch failed"
                )));
            }
            let offset = if query.search.is_empty() { 0 } else { 1000 };
            let end = (skip + limit).min(self.total);
            let products = (skip..end).map(|i| product(offset + i as i64 + 1)).collect();
            Ok(ProductsPage {
                products,
                total: self.total,
                skip,
                limit,
            })
        }
    }

    fn feed_with(source: &FakeSource, cooldown_ms: u64) -> ProductFeed<&FakeSource> {
        let config = AppConfig {
            page_size: 10,
            scroll_cooldown_ms: cooldown_ms,
            ..Default::default()
        };
        ProductFeed::new(source, Arc::new(Mutex::new(ProductsState::new())), &config)
    }

    #[tokio::test]
    async fn window_grows_monotonically_then_exhausts() {
        let source = FakeSource::new(25);
        let feed = feed_with(&source, 0);

        feed.refresh().await.unwrap();
        {
            let products = feed.products();
            let state = products.lock().unwrap();
            assert_eq!(state.items.len(), 10);
        }
        assert!(feed.has_more());

        assert_eq!(feed.load_more().await.unwrap(), LoadOutcome::Loaded);
        assert_eq!(feed.products().lock().unwrap().items.len(), 20);
        assert!(feed.has_more());

        assert_eq!(feed.load_more().await.unwrap(), LoadOutcome::Loaded);
        assert_eq!(feed.products().lock().unwrap().items.len(), 25);
        assert!(!feed.has_more());

        assert_eq!(feed.load_more().await.unwrap(), LoadOutcome::Exhausted);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_triggers_issue_one_request() {
        let source = FakeSource::with_delay(30, Duration::from_millis(50));
        let feed = feed_with(&source, 0);
        feed.refresh().await.unwrap();
        assert_eq!(source.calls(), 1);

        let (a, b) = tokio::join!(feed.load_more(), feed.load_more());
        let outcomes = [a.unwrap(), b.unwrap()];
        assert!(outcomes.contains(&LoadOutcome::Loaded));
        assert!(outcomes.contains(&LoadOutcome::AlreadyFetching));
        assert_eq!(source.calls(), 2);
        assert_eq!(feed.products().lock().unwrap().items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn proximity_signals_respect_the_cooldown() {
        let source = FakeSource::new(30);
        let feed = feed_with(&source, 1500);
        feed.refresh().await.unwrap();

        // Fetch just completed; the window is armed.
        assert_eq!(feed.poke().await.unwrap(), LoadOutcome::CoolingDown);
        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(feed.poke().await.unwrap(), LoadOutcome::CoolingDown);
        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(feed.poke().await.unwrap(), LoadOutcome::Loaded);
        assert_eq!(source.calls(), 2);

        // An explicit load-more is a user action and skips the cooldown.
        assert_eq!(feed.load_more().await.unwrap(), LoadOutcome::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn changing_the_query_discards_the_stale_response() {
        let source = FakeSource::with_delay(30, Duration::from_millis(50));
        let feed = feed_with(&source, 0);
        feed.refresh().await.unwrap();

        // Start a slow load-more, then switch the key mid-flight.
        let (more, switched) = tokio::join!(
            feed.load_more(),
            feed.set_query(QueryKey::search("widgets"))
        );
        assert_eq!(more.unwrap(), LoadOutcome::Stale);
        assert_eq!(switched.unwrap(), LoadOutcome::Loaded);

        let products = feed.products();
        let state = products.lock().unwrap();
        // Only the new key's first page; ids carry the search offset.
        assert_eq!(state.items.len(), 10);
        assert!(state.items.iter().all(|p| p.id > 1000));
        assert_eq!(state.skip, 0);
    }

    #[tokio::test]
    async fn unchanged_query_is_a_no_op() {
        let source = FakeSource::new(5);
        let feed = feed_with(&source, 0);
        feed.set_query(QueryKey::search("widgets")).await.unwrap();
        assert_eq!(
            feed.set_query(QueryKey::search("widgets")).await.unwrap(),
            LoadOutcome::Unchanged
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failure_parks_the_feed_in_error_until_retry() {
        let source = FakeSource::new(5);
        let feed = feed_with(&source, 0);

        assert!(feed.set_query(QueryKey::search("fail")).await.is_err());
        assert_eq!(feed.phase(), FeedPhase::Error);
        assert!(feed.products().lock().unwrap().error.is_some());

        // New key recovers.
        feed.set_query(QueryKey::default()).await.unwrap();
        assert_eq!(feed.phase(), FeedPhase::Idle);
        assert_eq!(feed.products().lock().unwrap().items.len(), 5);
        assert_eq!(feed.products().lock().unwrap().error, None);
    }

    #[tokio::test]
    async fn retry_reissues_the_same_parameters() {
        let source = FakeSource::new(5);
        let feed = feed_with(&source, 0);
        let _ = feed.set_query(QueryKey::search("fail")).await;
        assert!(feed.products().lock().unwrap().items.is_empty());

        // Window still empty, so retry goes back to page one.
        let _ = feed.retry().await;
        assert_eq!(source.calls(), 2);
    }
}
