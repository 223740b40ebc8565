use async_trait::async_trait;

/// Error type for key-value backend operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Key {0} holds a value of the wrong type")]
    WrongType(String),

    #[error("Corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn corrupt(key: &str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for key-value backend operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key prefixes of the persisted layout. Stable across restarts.
pub mod keys {
    pub const TOKEN_TO_USER: &str = "t2u:";
    pub const FOOD_TO_COUNT: &str = "f2c:";
    pub const CART_TO_INFO: &str = "c2i:";
    pub const ALL_ORDERS: &str = "a2o:";
    pub const USER_TO_ORDER: &str = "u2o:";

    pub fn token(token: &str) -> String {
        format!("{TOKEN_TO_USER}{token}")
    }

    pub fn food(food_id: i64) -> String {
        format!("{FOOD_TO_COUNT}{food_id}")
    }

    pub fn cart(cart_id: &str) -> String {
        format!("{CART_TO_INFO}{cart_id}")
    }

    pub fn user_order(user_id: i64) -> String {
        format!("{USER_TO_ORDER}{user_id}")
    }
}

/// Key-value backend the core persists all shared state in.
///
/// Implementations only move opaque strings and integers around; the
/// meaning of every record belongs to the component that owns its key
/// prefix. Counter operations must be atomic with respect to each other,
/// since they are the only linearization point for inventory.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a string value. Returns `None` when the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite a string value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Atomically add `delta` to an integer counter and return the new value.
    /// An absent key counts as zero.
    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64>;

    /// Atomically subtract `delta` from an integer counter and return the
    /// new value. The result may be negative.
    async fn decr_by(&self, key: &str, delta: i64) -> StoreResult<i64>;

    /// Append a value to the tail of a list.
    async fn list_push(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Read list elements `start..=stop`; negative indexes count from the tail.
    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    /// Drop every key. Only called at boot.
    async fn flush_all(&self) -> StoreResult<()>;
}
