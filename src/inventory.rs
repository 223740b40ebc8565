use std::sync::Arc;
use tracing::{info, warn};

use crate::store::keys;
use crate::{Catalog, FoodId, KeyValueStore, StoreError, StoreResult};

/// Per-food stock counters held in the key-value store.
///
/// The ledger never refuses a decrement; callers inspect the returned
/// remainder and compensate with [`InventoryLedger::release`].
pub struct InventoryLedger {
    store: Arc<dyn KeyValueStore>,
}

impl InventoryLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Seed every counter with the catalog's stock.
    pub async fn initialize(&self, catalog: &Catalog) -> StoreResult<()> {
        for food in catalog.foods() {
            self.store
                .set(&keys::food(food.id), &food.stock.to_string())
                .await?;
        }
        info!(foods = catalog.foods().len(), "Initialized inventory");
        Ok(())
    }

    /// Take `quantity` units and return what is left, possibly negative.
    pub async fn reserve(&self, food_id: FoodId, quantity: u32) -> StoreResult<i64> {
        self.store
            .decr_by(&keys::food(food_id), i64::from(quantity))
            .await
    }

    /// Give `quantity` units back and return the new count.
    pub async fn release(&self, food_id: FoodId, quantity: u32) -> StoreResult<i64> {
        let remaining = self
            .store
            .incr_by(&keys::food(food_id), i64::from(quantity))
            .await?;
        warn!(food_id, quantity, remaining, "Released reservation");
        Ok(remaining)
    }

    /// Current counter, `None` for a food that was never initialized.
    pub async fn remaining(&self, food_id: FoodId) -> StoreResult<Option<i64>> {
        let key = keys::food(food_id);
        self.store
            .get(&key)
            .await?
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| StoreError::corrupt(&key, "counter is not an integer"))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Food, MemoryStore};

    fn food(id: FoodId, stock: i64) -> Food {
        Food {
            id,
            price: 100,
            stock,
        }
    }

    async fn ledger_with(foods: Vec<Food>) -> InventoryLedger {
        let catalog = Catalog::new(Vec::new(), foods).unwrap();
        let ledger = InventoryLedger::new(Arc::new(MemoryStore::new()));
        ledger.initialize(&catalog).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn initialize_seeds_counters_from_the_catalog() {
        let ledger = ledger_with(vec![food(1, 5), food(2, 0)]).await;

        assert_eq!(ledger.remaining(1).await.unwrap(), Some(5));
        assert_eq!(ledger.remaining(2).await.unwrap(), Some(0));
        assert_eq!(ledger.remaining(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reserve_then_release_restores_the_counter() {
        let ledger = ledger_with(vec![food(1, 5)]).await;

        assert_eq!(ledger.reserve(1, 2).await.unwrap(), 3);
        assert_eq!(ledger.release(1, 2).await.unwrap(), 5);
        assert_eq!(ledger.remaining(1).await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn reserve_may_overdraw() {
        let ledger = ledger_with(vec![food(1, 1)]).await;

        assert_eq!(ledger.reserve(1, 3).await.unwrap(), -2);
    }
}
