use crate::models::{Product, ProductDetail, ProductsPage};

/// Product-domain state: the committed pagination window, the product
/// detail currently open, and the async phase flags for product fetches.
///
/// Mutations are named and total; async work commits here only at phase
/// boundaries (pending / fulfilled / rejected), never mid-flight.
#[derive(Debug, Default)]
pub struct ProductsState {
    pub items: Vec<Product>,
    pub current_product: Option<ProductDetail>,
    pub loading: bool,
    pub error: Option<String>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
    pub search_query: String,
}

impl ProductsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative fetched records cover the window when this is false.
    pub fn has_more(&self) -> bool {
        self.skip + self.limit < self.total
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn fetch_pending(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Drop the window for a new query key: empty items, offset zero.
    pub fn reset_window(&mut self) {
        self.items.clear();
        self.total = 0;
        self.skip = 0;
        self.fetch_pending();
    }

    /// Commit a fetched page. The first page of a window replaces the
    /// items; every later page appends in request order.
    pub fn fetch_fulfilled(&mut self, page: ProductsPage, reset: bool) {
        self.loading = false;
        self.error = None;
        if reset {
            self.items = page.products;
        } else {
            self.items.extend(page.products);
        }
        self.total = page.total;
        self.skip = page.skip;
        self.limit = page.limit;
    }

    pub fn fetch_rejected(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn detail_pending(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn detail_fulfilled(&mut self, detail: ProductDetail) {
        self.loading = false;
        self.current_product = Some(detail);
    }

    pub fn detail_rejected(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn clear_current_product(&mut self) {
        self.current_product = None;
    }

    pub fn created(&mut self, product: Product) {
        self.items.insert(0, product);
        self.total += 1;
    }

    pub fn updated(&mut self, product: Product) {
        if let Some(slot) = self.items.iter_mut().find(|p| p.id == product.id) {
            *slot = product.clone();
        }
        if let Some(current) = &mut self.current_product {
            if current.product.id == product.id {
                current.product = product;
            }
        }
    }

    pub fn deleted(&mut self, id: i64) {
        self.items.retain(|p| p.id != id);
        self.total = self.total.saturating_sub(1);
        if self
            .current_product
            .as_ref()
            .is_some_and(|c| c.product.id == id)
        {
            self.current_product = None;
        }
    }
}
