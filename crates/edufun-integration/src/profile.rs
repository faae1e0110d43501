use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::auth::AuthManager;
use crate::error::IntegrationError;
use crate::types::UserProfile;

/// Remote store for the signed-in user's profile document.
#[allow(async_fn_in_trait)]
pub trait ProfileRepository {
    /// Fetch the document. `None` when it does not exist.
    async fn read(&self) -> Result<Option<UserProfile>, IntegrationError>;

    /// Apply a field-level merge; fields not named in `update` are untouched.
    async fn merge(&self, update: &ProfileUpdate) -> Result<(), IntegrationError>;

    /// Remove the whole document. The account itself is kept.
    async fn delete(&self) -> Result<(), IntegrationError>;
}

/// A partial write addressed by dotted field paths, e.g. `settings.audio`.
///
/// Each path replaces exactly one field; intermediate objects are created
/// as needed and siblings are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    fields: Map<String, Value>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field at `path` to the serialized `value`.
    pub fn set<T: Serialize + ?Sized>(mut self, path: &str, value: &T) -> Result<Self, IntegrationError> {
        self.fields.insert(path.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Stamp `updatedAt`.
    pub fn touched(self, at: DateTime<Utc>) -> Result<Self, IntegrationError> {
        self.set("updatedAt", &at)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Request body for `PATCH /v1/users/{id}`.
    pub fn to_body(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Apply this update to a JSON document in place.
    pub fn apply_to(&self, doc: &mut Value) {
        for (path, value) in &self.fields {
            set_path(doc, path, value.clone());
        }
    }
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    if let Value::Object(map) = doc {
        insert_path(map, path, value);
    }
}

fn insert_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    let Some((head, rest)) = path.split_once('.') else {
        map.insert(path.to_string(), value);
        return;
    };
    let child = map
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    set_path(child, rest, value);
}

/// Profile documents on the EduFun server
pub struct ProfileApi {
    client: Client,
    base_url: String,
    auth: Arc<AuthManager>,
}

impl ProfileApi {
    pub fn new(client: Client, base_url: impl Into<String>, auth: Arc<AuthManager>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auth,
        }
    }

    fn document_url(&self) -> Result<(String, String), IntegrationError> {
        let token = self.auth.token().ok_or(IntegrationError::NotAuthenticated)?;
        let user_id = self.auth.user_id().ok_or(IntegrationError::NotAuthenticated)?;
        Ok((format!("{}/v1/users/{}", self.base_url, user_id), token))
    }
}

impl ProfileRepository for ProfileApi {
    async fn read(&self) -> Result<Option<UserProfile>, IntegrationError> {
        let (url, token) = self.document_url()?;
        let response = self.client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        handle_response(response).await.map(Some)
    }

    async fn merge(&self, update: &ProfileUpdate) -> Result<(), IntegrationError> {
        if update.is_empty() {
            return Ok(());
        }
        let (url, token) = self.document_url()?;
        let response = self.client
            .patch(&url)
            .bearer_auth(&token)
            .json(&update.to_body())
            .send()
            .await?;

        check_status(response).await?;
        info!("Merged profile fields: {:?}", update.fields().keys().collect::<Vec<_>>());
        Ok(())
    }

    async fn delete(&self) -> Result<(), IntegrationError> {
        let (url, token) = self.document_url()?;
        let response = self.client
            .delete(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        check_status(response).await?;
        info!("Deleted profile document");
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IntegrationError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let text = response.text().await.unwrap_or_default();
        return Err(IntegrationError::AuthFailed(text));
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(IntegrationError::ServerError {
            status: status.as_u16(),
            message: text,
        });
    }
    Ok(response)
}

async fn handle_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, IntegrationError> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{client, login_ok, reply, serve, Reply};
    use serde_json::json;

    async fn signed_in_api(mut replies: Vec<Reply>) -> ProfileApi {
        replies.push(login_ok());
        let base = serve(replies).await;
        let auth = Arc::new(AuthManager::new(client(), base.clone()));
        auth.login("parent@example.com", "secret1").await.unwrap();
        ProfileApi::new(client(), base, auth)
    }

    #[tokio::test]
    async fn test_missing_document_reads_as_none() {
        let api = signed_in_api(vec![reply("GET /v1/users/u1", 404, r#"{"error":"not found"}"#)]).await;
        assert_eq!(api.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_document_over_http() {
        let api = signed_in_api(vec![reply(
            "GET /v1/users/u1",
            200,
            r#"{"childName":"Adi","childAge":8,"settings":{"saveProgress":false}}"#,
        )])
        .await;
        let profile = api.read().await.unwrap().unwrap();
        assert_eq!(profile.child_name.as_deref(), Some("Adi"));
        assert_eq!(profile.settings.unwrap().save_progress, Some(false));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let api = signed_in_api(vec![
            reply("PATCH /v1/users/u1", 401, r#"{"error":"token expired"}"#),
            reply("DELETE /v1/users/u1", 403, ""),
        ])
        .await;
        let update = ProfileUpdate::new().set("childName", "Budi").unwrap();
        assert!(matches!(api.merge(&update).await, Err(IntegrationError::AuthFailed(_))));
        assert!(matches!(api.delete().await, Err(IntegrationError::AuthFailed(_))));
    }

    #[tokio::test]
    async fn test_server_error_on_merge() {
        let api = signed_in_api(vec![reply("PATCH /v1/users/u1", 500, "boom")]).await;
        let update = ProfileUpdate::new().set("childName", "Budi").unwrap();
        match api.merge(&update).await {
            Err(IntegrationError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_update_sends_nothing() {
        let api = ProfileApi::new(
            client(),
            "http://127.0.0.1:9",
            Arc::new(AuthManager::new(client(), "http://127.0.0.1:9")),
        );
        api.merge(&ProfileUpdate::new()).await.unwrap();
    }

    #[test]
    fn test_merge_replaces_only_named_fields() {
        let mut doc = json!({
            "childName": "Sari",
            "settings": {
                "audio": { "musicVolume": 0.9, "gameSounds": false },
                "saveProgress": false
            }
        });

        let update = ProfileUpdate::new()
            .set("settings.audio", &json!({ "musicVolume": 0.3 }))
            .unwrap();
        update.apply_to(&mut doc);

        assert_eq!(doc["childName"], "Sari");
        assert_eq!(doc["settings"]["saveProgress"], false);
        assert_eq!(doc["settings"]["audio"], json!({ "musicVolume": 0.3 }));
    }

    #[test]
    fn test_merge_creates_missing_parents() {
        let mut doc = json!({ "childName": "Sari" });
        ProfileUpdate::new()
            .set("settings.notifications", &json!({ "enabled": false }))
            .unwrap()
            .apply_to(&mut doc);

        assert_eq!(doc["settings"]["notifications"]["enabled"], false);
        assert_eq!(doc["childName"], "Sari");
    }

    #[test]
    fn test_merge_overwrites_scalar_parent() {
        let mut doc = json!({ "settings": "legacy" });
        ProfileUpdate::new()
            .set("settings.saveProgress", &true)
            .unwrap()
            .apply_to(&mut doc);
        assert_eq!(doc, json!({ "settings": { "saveProgress": true } }));
    }

    #[test]
    fn test_body_uses_dotted_paths() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let update = ProfileUpdate::new()
            .set("childName", "Rina")
            .unwrap()
            .touched(at)
            .unwrap();

        let body = update.to_body();
        assert_eq!(body["childName"], "Rina");
        assert_eq!(body["updatedAt"], "2024-05-01T10:00:00Z");
        assert!(!update.is_empty());
    }
}
