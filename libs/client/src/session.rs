use tracing::info;

use crewdesk_core::User;

use crate::api;
use crate::error::ApiError;
use crate::http::ApiClient;

/// Login/logout flows layered on the pipeline: what the dashboard shell does
/// around the raw client.
#[derive(Clone)]
pub struct AuthSession {
    client: ApiClient,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Exchanges credentials for a token pair, then hydrates and persists the
    /// profile of whoever just signed in.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let tokens = api::auth::login(&self.client, email, password).await?;
        self.client
            .store()
            .set_tokens(tokens)
            .await
            .map_err(ApiError::Store)?;

        let user = api::auth::me(&self.client).await?;
        self.client
            .store()
            .set_user(user.clone())
            .await
            .map_err(ApiError::Store)?;
        info!(user = %user.email, "logged in");
        Ok(user)
    }

    /// Clears the stored session and tells subscribers it is gone.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client
            .store()
            .clear_session()
            .await
            .map_err(ApiError::Store)?;
        self.client.events().notify_session_expired();
        info!("logged out");
        Ok(())
    }

    /// Re-fetches the profile for the stored session, if any.
    pub async fn load_user(&self) -> Result<Option<User>, ApiError> {
        if !self.is_authenticated().await? {
            return Ok(None);
        }
        let user = api::auth::me(&self.client).await?;
        self.client
            .store()
            .set_user(user.clone())
            .await
            .map_err(ApiError::Store)?;
        Ok(Some(user))
    }

    pub async fn current_user(&self) -> Result<Option<User>, ApiError> {
        self.client.store().user().await.map_err(ApiError::Store)
    }

    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self
            .client
            .store()
            .tokens()
            .await
            .map_err(ApiError::Store)?
            .is_some())
    }
}
