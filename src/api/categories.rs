use reqwest::Method;

use crate::api::client::ApiClient;
use crate::error::AppResult;
use crate::models::Category;

impl ApiClient {
    pub async fn fetch_categories(&self) -> AppResult<Vec<Category>> {
        let url = self.endpoint("/products/categories")?;
        self.execute(self.request(Method::GET, url)).await
    }

    /// Resolve a category by slug from the full list; `None` when the slug
    /// is unknown.
    pub async fn fetch_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let categories = self.fetch_categories().await?;
        Ok(categories.into_iter().find(|c| c.slug == slug))
    }
}
