use reqwest::Method;

use crate::api::client::ApiClient;
use crate::dto::products::{CreateProductPayload, UpdateProductPayload};
use crate::error::AppResult;
use crate::feed::{ProductSource, QueryKey};
use crate::models::{ProductDetail, ProductsPage};

impl ApiClient {
    /// Fetch one page of the product listing. A category scopes the listing
    /// and wins over a search term; a search term routes to the search
    /// endpoint; otherwise the plain listing is paged.
    pub async fn fetch_products(
        &self,
        query: &QueryKey,
        skip: usize,
        limit: usize,
    ) -> AppResult<ProductsPage> {
        let url = if !query.category.is_empty() {
            let mut url = self.endpoint(&format!("/products/category/{}", query.category))?;
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string())
                .append_pair("skip", &skip.to_string());
            url
        } else if !query.search.is_empty() {
            let mut url = self.endpoint("/products/search")?;
            url.query_pairs_mut()
                .append_pair("q", &query.search)
                .append_pair("limit", &limit.to_string())
                .append_pair("skip", &skip.to_string());
            url
        } else {
            let mut url = self.endpoint("/products")?;
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string())
                .append_pair("skip", &skip.to_string());
            url
        };
        self.execute(self.request(Method::GET, url)).await
    }

    pub async fn fetch_product(&self, id: i64) -> AppResult<ProductDetail> {
        let url = self.endpoint(&format!("/products/{id}"))?;
        self.execute(self.request(Method::GET, url)).await
    }

    /// Create a product in the remote demo dataset. The service simulates
    /// the write in memory; nothing durable is guaranteed.
    pub async fn create_product(&self, payload: &CreateProductPayload) -> AppResult<ProductDetail> {
        let url = self.endpoint("/products/add")?;
        let request = self.request(Method::POST, url).json(payload);
        self.execute(request).await
    }

    pub async fn update_product(
        &self,
        id: i64,
        payload: &UpdateProductPayload,
    ) -> AppResult<ProductDetail> {
        let url = self.endpoint(&format!("/products/{id}"))?;
        let request = self.request(Method::PATCH, url).json(payload);
        self.execute(request).await
    }

    pub async fn delete_product(&self, id: i64) -> AppResult<()> {
        let url = self.endpoint(&format!("/products/{id}"))?;
        let _body: serde_json::Value = self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

impl ProductSource for ApiClient {
    async fn fetch_page(
        &self,
        query: &QueryKey,
        skip: usize,
        limit: usize,
    ) -> AppResult<ProductsPage> {
        self.fetch_products(query, skip, limit).await
    }
}
