//! Filter and sort engine for the browse view.
//!
//! Everything here is a pure function over an in-memory product list: no
//! I/O, deterministic, and never failing. Filtering is the intersection of
//! every active constraint; sorting is a stable single-key sort applied
//! strictly after filtering.

use serde::{Deserialize, Serialize};

use crate::models::Product;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Active filter constraints. Absent fields mean "no constraint"; an empty
/// brand list likewise filters nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductFilters {
    pub price_range: Option<PriceRange>,
    pub min_rating: Option<f64>,
    pub brands: Vec<String>,
    pub in_stock: Option<bool>,
}

impl ProductFilters {
    pub fn is_active(&self) -> bool {
        self.price_range.is_some()
            || self.min_rating.is_some()
            || !self.brands.is_empty()
            || self.in_stock.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    PriceAsc,
    PriceDesc,
    RatingAsc,
    RatingDesc,
    NameAsc,
    NameDesc,
    #[default]
    Newest,
    Oldest,
}

impl SortOption {
    pub const ALL: [SortOption; 8] = [
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::RatingAsc,
        SortOption::RatingDesc,
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::Newest,
        SortOption::Oldest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::PriceAsc => "price-asc",
            SortOption::PriceDesc => "price-desc",
            SortOption::RatingAsc => "rating-asc",
            SortOption::RatingDesc => "rating-desc",
            SortOption::NameAsc => "name-asc",
            SortOption::NameDesc => "name-desc",
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

/// Keep products passing every active constraint. A range with `min > max`
/// simply matches nothing; that is accepted input, not an error.
pub fn apply_filters(products: &[Product], filters: &ProductFilters) -> Vec<Product> {
    products
        .iter()
        .filter(|product| {
            if let Some(range) = &filters.price_range {
                if product.price < range.min || product.price > range.max {
                    return false;
                }
            }
            if let Some(min_rating) = filters.min_rating {
                if min_rating > 0.0 && product.rating < min_rating {
                    return false;
                }
            }
            if !filters.brands.is_empty() && !filters.brands.contains(&product.brand) {
                return false;
            }
            if let Some(in_stock) = filters.in_stock {
                if in_stock {
                    return product.stock > 0;
                }
                return product.stock == 0;
            }
            true
        })
        .cloned()
        .collect()
}

/// Stable single-key sort; products with equal keys keep their input order.
pub fn sort_products(products: &[Product], sort: SortOption) -> Vec<Product> {
    let mut sorted = products.to_vec();
    match sort {
        SortOption::PriceAsc => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::PriceDesc => sorted.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOption::RatingAsc => sorted.sort_by(|a, b| a.rating.total_cmp(&b.rating)),
        SortOption::RatingDesc => sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortOption::NameAsc => sorted.sort_by(|a, b| name_key(a).cmp(&name_key(b))),
        SortOption::NameDesc => sorted.sort_by(|a, b| name_key(b).cmp(&name_key(a))),
        SortOption::Newest => sorted.sort_by(|a, b| b.id.cmp(&a.id)),
        SortOption::Oldest => sorted.sort_by(|a, b| a.id.cmp(&b.id)),
    }
    sorted
}

fn name_key(product: &Product) -> String {
    product.title.to_lowercase()
}

/// The derived browse view: filter, then sort.
pub fn apply_filters_and_sort(
    products: &[Product],
    filters: &ProductFilters,
    sort: SortOption,
) -> Vec<Product> {
    let filtered = apply_filters(products, filters);
    sort_products(&filtered, sort)
}

/// Distinct brands across the full product set, sorted; products without a
/// brand are skipped. Recomputed whenever the catalog changes.
pub fn unique_brands(products: &[Product]) -> Vec<String> {
    let mut brands: Vec<String> = products
        .iter()
        .filter(|p| !p.brand.is_empty())
        .map(|p| p.brand.clone())
        .collect();
    brands.sort();
    brands.dedup();
    brands
}

/// Min/max price over the full product set; zeros when the set is empty.
pub fn price_bounds(products: &[Product]) -> PriceRange {
    if products.is_empty() {
        return PriceRange { min: 0.0, max: 0.0 };
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for product in products {
        min = min.min(product.price);
        max = max.max(product.price);
    }
    PriceRange { min, max }
}
