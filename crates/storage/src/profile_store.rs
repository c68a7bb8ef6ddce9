//! Read-only client for user profile documents held in the cloud document database.
//!
//! Documents live at `users/{uid}` and use the typed-value JSON encoding
//! (`{"stringValue": ..}`, `{"integerValue": "12"}`).

use std::env;

use async_trait::async_trait;
use practice_core::model::{MediaUri, UserId, UserProfile};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::repository::{ProfileRepository, StorageError};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone, Debug)]
pub struct ProfileStoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: Option<String>,
}

impl ProfileStoreConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let project_id = env::var("PRACTICE_PROFILE_PROJECT").ok()?;
        if project_id.trim().is_empty() {
            return None;
        }
        let api_key = env::var("PRACTICE_PROFILE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let base_url =
            env::var("PRACTICE_PROFILE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Some(Self {
            base_url,
            project_id,
            api_key,
        })
    }

    fn document_url(&self, user: &UserId) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/users/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            user.as_str()
        )
    }
}

#[derive(Clone)]
pub struct ProfileStoreClient {
    client: Client,
    config: ProfileStoreConfig,
    id_token: Option<String>,
}

impl ProfileStoreClient {
    #[must_use]
    pub fn new(config: ProfileStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            id_token: None,
        }
    }

    /// Attach the signed-in user's id token; documents are then read with the user's rules.
    #[must_use]
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: Map<String, Value>,
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn count_field(fields: &Map<String, Value>, key: &str) -> u32 {
    let Some(value) = fields.get(key) else {
        return 0;
    };
    // integerValue is transported as a string; doubleValue as a number.
    if let Some(raw) = value.get("integerValue") {
        let parsed = match raw {
            Value::String(s) => s.parse::<i64>().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        return parsed.and_then(|n| u32::try_from(n).ok()).unwrap_or(0);
    }
    value
        .get("doubleValue")
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map_or(0, |n| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let n = n.min(f64::from(u32::MAX)) as u32;
            n
        })
}

fn profile_from_fields(fields: &Map<String, Value>) -> UserProfile {
    UserProfile {
        username: string_field(fields, "username"),
        avatar: string_field(fields, "photoURL").and_then(|raw| MediaUri::parse(raw).ok()),
        streak_count: count_field(fields, "streakCount"),
        xp: count_field(fields, "xpPoints"),
    }
}

#[async_trait]
impl ProfileRepository for ProfileStoreClient {
    async fn get_profile(&self, user: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let mut request = self.client.get(self.config.document_url(user));
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }
        if let Some(token) = &self.id_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(user = %user, "no profile document");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StorageError::HttpStatus(response.status()));
        }

        let body = response.bytes().await?;
        let document: Document =
            serde_json::from_slice(&body).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(profile_from_fields(&document.fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_fields_map_to_profile() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/users/u1",
            "fields": {
                "username": { "stringValue": "Wanjiru" },
                "photoURL": { "stringValue": "https://img.example.net/u1.png" },
                "streakCount": { "integerValue": "12" },
                "xpPoints": { "doubleValue": 340.0 }
            }
        }))
        .unwrap();

        let profile = profile_from_fields(&doc.fields);
        assert_eq!(profile.display_name(), "Wanjiru");
        assert_eq!(profile.streak_count, 12);
        assert_eq!(profile.xp, 340);
        assert!(profile.avatar.is_some());
    }

    #[test]
    fn missing_or_negative_counts_are_zero() {
        let doc: Document = serde_json::from_value(json!({
            "fields": { "streakCount": { "integerValue": "-3" } }
        }))
        .unwrap();
        let profile = profile_from_fields(&doc.fields);
        assert_eq!(profile.streak_count, 0);
        assert_eq!(profile.xp, 0);
        assert_eq!(profile.display_name(), "User");
    }

    #[test]
    fn document_url_targets_users_collection() {
        let config = ProfileStoreConfig {
            base_url: DEFAULT_BASE_URL.into(),
            project_id: "demo".into(),
            api_key: None,
        };
        assert_eq!(
            config.document_url(&UserId::new("abc")),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/users/abc"
        );
    }
}
