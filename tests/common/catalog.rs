use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use food_order_core::{CatalogError, CatalogSource, Food, User};

/// In-memory catalog source for tests
pub struct StaticCatalogSource {
    users: Vec<User>,
    foods: Vec<Food>,
    fail: bool,
    // Track loads for verification in tests
    loads: Arc<RwLock<u32>>,
}

impl StaticCatalogSource {
    pub fn new(users: Vec<User>, foods: Vec<Food>) -> Self {
        Self {
            users,
            foods,
            fail: false,
            loads: Arc::new(RwLock::new(0)),
        }
    }

    /// A source whose database is unreachable.
    pub fn unreachable() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new(), Vec::new())
        }
    }

    pub fn load_count(&self) -> u32 {
        *self.loads.read()
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn load_users(&self) -> Result<Vec<User>, CatalogError> {
        if self.fail {
            return Err(sqlx::Error::PoolClosed.into());
        }
        *self.loads.write() += 1;
        Ok(self.users.clone())
    }

    async fn load_foods(&self) -> Result<Vec<Food>, CatalogError> {
        if self.fail {
            return Err(sqlx::Error::PoolClosed.into());
        }
        Ok(self.foods.clone())
    }
}
