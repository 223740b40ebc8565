use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::store::keys;
use crate::{KeyValueStore, StoreError, StoreResult, UserId};

/// Read-through cache from access token to user id.
///
/// The backing store is the source of truth and is shared between
/// instances; the in-memory map only saves round-trips. Entries are never
/// evicted, since tokens live as long as the process.
pub struct TokenCache {
    store: Arc<dyn KeyValueStore>,
    entries: RwLock<HashMap<String, UserId>>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve `token` to its user, consulting the store on a cache miss.
    pub async fn resolve(&self, token: &str) -> StoreResult<Option<UserId>> {
        if token.is_empty() {
            return Ok(None);
        }
        if let Some(user_id) = self.cached(token) {
            return Ok(Some(user_id));
        }

        let key = keys::token(token);
        let Some(raw) = self.store.get(&key).await? else {
            debug!("Unknown access token");
            return Ok(None);
        };
        let user_id = raw
            .parse::<UserId>()
            .map_err(|_| StoreError::corrupt(&key, "user id is not an integer"))?;

        // Racing fillers write the same value, so a lost update is harmless.
        self.entries.write().insert(token.to_string(), user_id);
        Ok(Some(user_id))
    }

    /// Bind `token` to `user_id`. The map is only touched once the store
    /// write has succeeded.
    pub async fn bind(&self, token: &str, user_id: UserId) -> StoreResult<()> {
        self.store
            .set(&keys::token(token), &user_id.to_string())
            .await?;
        self.entries.write().insert(token.to_string(), user_id);
        Ok(())
    }

    /// Lookup without touching the store.
    pub fn cached(&self, token: &str) -> Option<UserId> {
        self.entries.read().get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
