use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::info;

use crate::{CatalogError, CatalogSource, Food, User};

/// [`CatalogSource`] reading the `users` and `foods` tables from PostgreSQL.
pub struct PostgresCatalogSource {
    pool: Arc<PgPool>,
}

impl PostgresCatalogSource {
    /// Create a new PostgresCatalogSource with the given connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, CatalogError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalogSource {
    async fn load_users(&self) -> Result<Vec<User>, CatalogError> {
        let rows = sqlx::query("SELECT id::BIGINT AS id, name, password FROM users ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;

        let users: Vec<User> = rows
            .iter()
            .map(|r| User {
                id: r.get("id"),
                name: r.get("name"),
                password: r.get("password"),
            })
            .collect();
        info!(count = users.len(), "Loaded users");
        Ok(users)
    }

    async fn load_foods(&self) -> Result<Vec<Food>, CatalogError> {
        let rows = sqlx::query(
            r#"
            SELECT id::BIGINT AS id, price::BIGINT AS price, stock::BIGINT AS stock
            FROM foods
            ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        let foods: Vec<Food> = rows
            .iter()
            .map(|r| Food {
                id: r.get("id"),
                price: r.get("price"),
                stock: r.get("stock"),
            })
            .collect();
        info!(count = foods.len(), "Loaded foods");
        Ok(foods)
    }
}
