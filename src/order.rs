use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::store::keys;
use crate::{FoodId, KeyValueStore, StoreResult, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub food_id: FoodId,
    pub count: u32,
}

/// A placed order. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub user_id: UserId,
    pub id: String,
    pub items: Vec<OrderItem>,
    pub total: i64,
}

/// Per-user order records plus the global append-only order log.
pub struct OrderLedger {
    store: Arc<dyn KeyValueStore>,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Fresh 128-bit hex order id.
    pub fn next_order_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// The order placed by `user_id`, if any.
    ///
    /// An unreadable record counts as no order, the same way [`OrderLedger::all`]
    /// skips unreadable log entries. The user may then order again, which
    /// overwrites the record.
    pub async fn find_for_user(&self, user_id: UserId) -> StoreResult<Option<Order>> {
        let key = keys::user_order(user_id);
        let Some(record) = self.store.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&record) {
            Ok(order) => Ok(Some(order)),
            Err(e) => {
                warn!(%key, error = %e, "Ignoring unreadable order record");
                Ok(None)
            }
        }
    }

    /// Persist the per-user record, then append to the global log.
    ///
    /// Does not check for an existing record; callers do that beforehand,
    /// and the two steps are not atomic.
    pub async fn record(&self, order: &Order) -> StoreResult<()> {
        let content = serde_json::to_string(order)?;
        self.store
            .set(&keys::user_order(order.user_id), &content)
            .await?;
        self.store.list_push(keys::ALL_ORDERS, &content).await
    }

    /// Every recorded order in placement order. Unreadable entries are
    /// skipped.
    pub async fn all(&self) -> StoreResult<Vec<Order>> {
        let records = self.store.list_range(keys::ALL_ORDERS, 0, -1).await?;
        Ok(records
            .iter()
            .filter_map(|record| match serde_json::from_str(record) {
                Ok(order) => Some(order),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable order log entry");
                    None
                }
            })
            .collect())
    }
}
