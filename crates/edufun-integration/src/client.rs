use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::AuthManager;
use crate::error::IntegrationError;
use crate::profile::ProfileApi;

/// Facade for the EduFun server. Shares one HTTP client and one auth
/// session between the account and profile APIs.
pub struct ServerClient {
    client: Client,
    base_url: String,
    auth: Arc<AuthManager>,
}

impl ServerClient {
    /// Create a client for `base_url`. `timeout` of `None` leaves requests
    /// unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, IntegrationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| IntegrationError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = normalize_base_url(base_url);
        let auth = Arc::new(AuthManager::new(client.clone(), base_url.clone()));

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared auth session.
    pub fn auth(&self) -> Arc<AuthManager> {
        Arc::clone(&self.auth)
    }

    /// Profile document API bound to the shared auth session.
    pub fn profiles(&self) -> ProfileApi {
        ProfileApi::new(self.client.clone(), self.base_url.clone(), Arc::clone(&self.auth))
    }

    /// Whether the client has an authenticated session.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
