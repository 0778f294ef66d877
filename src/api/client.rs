use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult, default_status_message};
use crate::storage::{SharedStorage, Storage, keys};

/// Thin wrapper over the remote storefront API. Holds the base URL and the
/// shadow store the bearer token is read from on every request, so login
/// state is picked up without rebuilding the client.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    storage: SharedStorage,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig, storage: SharedStorage) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let base_url = Url::parse(&config.api_base_url)?;
        Ok(Self {
            http,
            base_url,
            storage,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| AppError::Internal(anyhow::anyhow!("invalid endpoint path: {err}")))
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self.http.request(method, url);
        if let Some(token) = self.storage.get(keys::AUTH_TOKEN) {
            request = request.bearer_auth(token);
        }
        request
    }

    pub(crate) fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Send a request and decode the body, mapping failures onto the error
    /// taxonomy: transport problems, error statuses with a server-supplied
    /// or status-default message, and malformed bodies.
    pub(crate) async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = request.send().await.map_err(AppError::Network)?;
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(AppError::Decode)
        } else {
            Err(api_error(status, response).await)
        }
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> AppError {
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| default_status_message(status).to_string());
    AppError::Api { status, message }
}
