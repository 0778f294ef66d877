//! Query-string contract for the browse view.
//!
//! All filter/sort state round-trips through the URL so views are shareable
//! and back/forward navigation restores them. Parsing never fails: malformed
//! values deactivate their dimension, unknown sorts fall back to the default.

use url::form_urlencoded;

use crate::filters::{PriceRange, ProductFilters, SortOption};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrowseQuery {
    pub category: String,
    pub search: String,
    pub filters: ProductFilters,
    pub sort: SortOption,
}

impl BrowseQuery {
    /// Parse a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let mut category = String::new();
        let mut search = String::new();
        let mut price_min: Option<f64> = None;
        let mut price_max: Option<f64> = None;
        let mut min_rating: Option<f64> = None;
        let mut brands: Vec<String> = Vec::new();
        let mut in_stock: Option<bool> = None;
        let mut sort = SortOption::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "category" => category = value.into_owned(),
                "q" => search = value.into_owned(),
                "priceMin" => price_min = value.parse().ok(),
                "priceMax" => price_max = value.parse().ok(),
                "minRating" => min_rating = value.parse().ok(),
                "brands" => {
                    brands = value
                        .split(',')
                        .filter(|b| !b.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "inStock" => {
                    in_stock = match value.as_ref() {
                        "true" => Some(true),
                        "false" => Some(false),
                        _ => None,
                    };
                }
                "sort" => sort = SortOption::parse(&value).unwrap_or_default(),
                _ => {}
            }
        }

        // Both ends are required for the range to be active.
        let price_range = match (price_min, price_max) {
            (Some(min), Some(max)) => Some(PriceRange { min, max }),
            _ => None,
        };

        Self {
            category,
            search,
            filters: ProductFilters {
                price_range,
                min_rating,
                brands,
                in_stock,
            },
            sort,
        }
    }

    /// Build the query string; inactive filters and the default sort are
    /// omitted so shared URLs stay minimal.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if !self.category.is_empty() {
            serializer.append_pair("category", &self.category);
        }
        if !self.search.is_empty() {
            serializer.append_pair("q", &self.search);
        }
        if let Some(range) = &self.filters.price_range {
            serializer.append_pair("priceMin", &format_number(range.min));
            serializer.append_pair("priceMax", &format_number(range.max));
        }
        if let Some(min_rating) = self.filters.min_rating {
            if min_rating > 0.0 {
                serializer.append_pair("minRating", &format_number(min_rating));
            }
        }
        if !self.filters.brands.is_empty() {
            serializer.append_pair("brands", &self.filters.brands.join(","));
        }
        if let Some(in_stock) = self.filters.in_stock {
            serializer.append_pair("inStock", if in_stock { "true" } else { "false" });
        }
        if self.sort != SortOption::default() {
            serializer.append_pair("sort", self.sort.as_str());
        }

        serializer.finish()
    }
}

// Integral values print without a trailing ".0" so URLs match what a user
// would type.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
