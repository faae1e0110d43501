use std::sync::{Arc, RwLock};

use reqwest::Client;
use tracing::{info, warn};

use crate::error::{classify_auth_failure, IntegrationError};
use crate::types::{AuthResponse, UserInfo};

/// Account operations used by the settings screen.
#[allow(async_fn_in_trait)]
pub trait AuthService {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<UserInfo>;

    /// Confirm the current password before a sensitive change.
    async fn reauthenticate(&self, password: &str) -> Result<(), IntegrationError>;

    /// Replace the password of the signed-in user.
    async fn change_password(&self, new_password: &str) -> Result<(), IntegrationError>;

    /// End the session.
    async fn sign_out(&self) -> Result<(), IntegrationError>;
}

impl<T: AuthService> AuthService for Arc<T> {
    fn current_user(&self) -> Option<UserInfo> {
        (**self).current_user()
    }

    async fn reauthenticate(&self, password: &str) -> Result<(), IntegrationError> {
        (**self).reauthenticate(password).await
    }

    async fn change_password(&self, new_password: &str) -> Result<(), IntegrationError> {
        (**self).change_password(new_password).await
    }

    async fn sign_out(&self) -> Result<(), IntegrationError> {
        (**self).sign_out().await
    }
}

/// Manages authentication state against the EduFun server
pub struct AuthManager {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    refresh_token: Arc<RwLock<Option<String>>>,
    user: Arc<RwLock<Option<UserInfo>>>,
}

impl AuthManager {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: Arc::new(RwLock::new(None)),
            refresh_token: Arc::new(RwLock::new(None)),
            user: Arc::new(RwLock::new(None)),
        }
    }

    /// Log in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, IntegrationError> {
        let url = format!("{}/v1/auth/login", self.base_url);

        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await?;

        let auth = read_auth_response(response).await?;
        self.store(&auth);

        info!("Logged in as {}", auth.user.email);
        Ok(auth)
    }

    /// Get the current token, if authenticated
    pub fn token(&self) -> Option<String> {
        self.token.read().ok()?.clone()
    }

    /// Get the current user ID, if authenticated
    pub fn user_id(&self) -> Option<String> {
        self.user.read().ok()?.as_ref().map(|u| u.id.clone())
    }

    /// Whether we currently have a token
    pub fn is_authenticated(&self) -> bool {
        self.token.read().ok().map(|t| t.is_some()).unwrap_or(false)
    }

    fn store(&self, auth: &AuthResponse) {
        if let Ok(mut t) = self.token.write() {
            *t = Some(auth.token.clone());
        }
        if let Ok(mut rt) = self.refresh_token.write() {
            *rt = Some(auth.refresh_token.clone());
        }
        if let Ok(mut u) = self.user.write() {
            *u = Some(auth.user.clone());
        }
    }

    /// Clear all auth state
    fn clear(&self) {
        if let Ok(mut t) = self.token.write() {
            *t = None;
        }
        if let Ok(mut rt) = self.refresh_token.write() {
            *rt = None;
        }
        if let Ok(mut u) = self.user.write() {
            *u = None;
        }
    }
}

impl AuthService for AuthManager {
    fn current_user(&self) -> Option<UserInfo> {
        if !self.is_authenticated() {
            return None;
        }
        self.user.read().ok()?.clone()
    }

    async fn reauthenticate(&self, password: &str) -> Result<(), IntegrationError> {
        let token = self.token().ok_or(IntegrationError::NotAuthenticated)?;
        let user = self.current_user().ok_or(IntegrationError::NotAuthenticated)?;
        let url = format!("{}/v1/auth/reauthenticate", self.base_url);

        let body = serde_json::json!({
            "email": user.email,
            "password": password,
        });

        let response = self.client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let auth = read_auth_response(response).await?;
        self.store(&auth);
        Ok(())
    }

    async fn change_password(&self, new_password: &str) -> Result<(), IntegrationError> {
        let token = self.token().ok_or(IntegrationError::NotAuthenticated)?;
        let url = format!("{}/v1/auth/password", self.base_url);

        let body = serde_json::json!({ "newPassword": new_password });

        let response = self.client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if is_auth_rejection(status) {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_auth_failure(&text));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IntegrationError::ServerError {
                status: status.as_u16(),
                message: text,
            });
        }

        info!("Password changed");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IntegrationError> {
        if let Some(token) = self.token() {
            let url = format!("{}/v1/auth/logout", self.base_url);
            // The local session ends even if the server cannot be told.
            if let Err(e) = self.client.post(&url).bearer_auth(&token).send().await {
                warn!("Logout request failed: {}", e);
            }
        }
        self.clear();
        warn!("Logged out");
        Ok(())
    }
}

fn is_auth_rejection(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::BAD_REQUEST
        || status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
}

async fn read_auth_response(response: reqwest::Response) -> Result<AuthResponse, IntegrationError> {
    let status = response.status();
    if is_auth_rejection(status) {
        let text = response.text().await.unwrap_or_default();
        return Err(classify_auth_failure(&text));
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(IntegrationError::ServerError {
            status: status.as_u16(),
            message: text,
        });
    }
    Ok(response.json().await?)
}
