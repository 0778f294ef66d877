use reqwest::Method;

use crate::api::client::ApiClient;
use crate::dto::auth::{AuthUserResponse, LoginCredentials};
use crate::error::AppResult;
use crate::storage::{Storage, keys};

impl ApiClient {
    /// Authenticate against the remote service. The access token is written
    /// through to the shadow store on success so subsequent requests carry
    /// it as a bearer.
    pub async fn login(&self, credentials: &LoginCredentials) -> AppResult<AuthUserResponse> {
        let url = self.endpoint("/auth/login")?;
        let request = self.request(Method::POST, url).json(credentials);
        let response: AuthUserResponse = self.execute(request).await?;
        if let Some(token) = &response.access_token {
            self.storage().set(keys::AUTH_TOKEN, token);
        }
        Ok(response)
    }

    /// Profile of the bearer-token holder; fails with 401 when the session
    /// is not valid.
    pub async fn current_user(&self) -> AppResult<AuthUserResponse> {
        let url = self.endpoint("/auth/me")?;
        self.execute(self.request(Method::GET, url)).await
    }
}
