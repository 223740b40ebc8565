use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

pub type UserId = i64;
pub type FoodId = i64;

/// Error type for the boot-time catalog load
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate user name: {0}")]
    DuplicateUserName(String),
}

/// A registered user, read once at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub password: String,
}

/// A catalog entry. `stock` is the initial stock; the live count is kept by
/// the inventory ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Food {
    pub id: FoodId,
    pub price: i64,
    pub stock: i64,
}

/// Source of the user table and food catalog.
///
/// Read exactly once during boot; the core never comes back to it.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_users(&self) -> Result<Vec<User>, CatalogError>;

    async fn load_foods(&self) -> Result<Vec<Food>, CatalogError>;
}

/// Immutable snapshot of users and foods.
#[derive(Debug, Clone)]
pub struct Catalog {
    users_by_id: HashMap<UserId, User>,
    users_by_name: HashMap<String, UserId>,
    foods_by_id: HashMap<FoodId, Food>,
    foods: Vec<Food>,
    foods_json: String,
}

impl Catalog {
    /// Build the snapshot and pre-render the food list served to readers.
    pub fn new(users: Vec<User>, foods: Vec<Food>) -> Result<Self, CatalogError> {
        let mut users_by_id = HashMap::with_capacity(users.len());
        let mut users_by_name = HashMap::with_capacity(users.len());
        for user in users {
            if users_by_name.insert(user.name.clone(), user.id).is_some() {
                return Err(CatalogError::DuplicateUserName(user.name));
            }
            users_by_id.insert(user.id, user);
        }

        let foods_by_id = foods.iter().map(|food| (food.id, *food)).collect();
        let foods_json = serde_json::to_string_pretty(&foods)?;

        Ok(Self {
            users_by_id,
            users_by_name,
            foods_by_id,
            foods,
            foods_json,
        })
    }

    /// Load both tables from `source`.
    pub async fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let users = source.load_users().await?;
        let foods = source.load_foods().await?;
        Self::new(users, foods)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users_by_id.get(&id)
    }

    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users_by_name
            .get(name)
            .and_then(|id| self.users_by_id.get(id))
    }

    pub fn food(&self, id: FoodId) -> Option<&Food> {
        self.foods_by_id.get(&id)
    }

    /// Foods in load order.
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn foods_json(&self) -> &str {
        &self.foods_json
    }

    pub fn user_count(&self) -> usize {
        self.users_by_id.len()
    }
}
