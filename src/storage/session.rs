use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use super::{KeyValueStorage, StorageError};
use crate::models::Session;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialized user profile.
pub const USER_KEY: &str = "user";

/// The single accessor for the persisted session.
///
/// Cloned freely; every clone shares the same storage. Nothing is cached,
/// so each read observes the latest write from any component.
#[derive(Clone)]
pub struct SessionAccessor {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionAccessor {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        SessionAccessor { storage }
    }

    /// The stored bearer token. An empty value counts as absent.
    pub async fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get(TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    /// The stored user profile. Unparseable profiles read as absent.
    pub async fn user(&self) -> Result<Option<Value>, StorageError> {
        let Some(raw) = self.storage.get(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Stored user profile is not valid JSON: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn load(&self) -> Result<Option<Session>, StorageError> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };
        let user = self.user().await?.unwrap_or(Value::Null);
        Ok(Some(Session { token, user }))
    }

    /// A storage failure reads as "not authenticated".
    pub async fn is_authenticated(&self) -> bool {
        match self.token().await {
            Ok(token) => token.is_some(),
            Err(e) => {
                error!("Failed to read session token: {}", e);
                false
            }
        }
    }

    /// Writes the user, then the token. The token decides whether a session
    /// exists, so a failed write leaves the previous session in place.
    pub async fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)?;
        let previous_user = self.storage.get(USER_KEY).await?;

        self.storage.set(USER_KEY, &user).await?;
        if let Err(e) = self.storage.set(TOKEN_KEY, &session.token).await {
            self.restore(USER_KEY, previous_user.as_deref()).await;
            return Err(e);
        }
        info!("Session stored for user {}", describe_user(&session.user));
        Ok(())
    }

    async fn restore(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.storage.set(key, value).await,
            None => self.storage.remove(key).await,
        };
        if let Err(e) = result {
            error!("Failed to restore '{}' after a partial session write: {}", key, e);
        }
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY).await?;
        self.storage.remove(USER_KEY).await?;
        info!("Session cleared.");
        Ok(())
    }
}

/// Short label for logs; never the token.
fn describe_user(user: &Value) -> String {
    ["email", "id", "username"]
        .iter()
        .find_map(|key| user.get(key))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "<unknown>".to_string())
}
