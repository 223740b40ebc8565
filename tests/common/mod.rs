pub mod catalog;
pub mod faulty_store;

pub use catalog::StaticCatalogSource;
pub use faulty_store::FaultyStore;

use std::sync::Arc;

use food_order_core::{AdminPolicy, Food, KeyValueStore, Marketplace, MemoryStore, User};

pub const ROOT: i64 = 1;
pub const ALICE: i64 = 42;
pub const BOB: i64 = 9;
pub const MALLORY: i64 = 99;

/// First id of the crowd of users used by concurrency tests.
pub const CROWD_START: i64 = 1000;
pub const CROWD_SIZE: i64 = 8;

/// Scarce food used by concurrency tests.
pub const SCARCE_FOOD: i64 = 11;
pub const SCARCE_STOCK: i64 = 3;

fn user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        password: format!("{name}-password"),
    }
}

pub fn users() -> Vec<User> {
    let mut users = vec![
        user(ROOT, "root"),
        user(ALICE, "alice"),
        user(BOB, "bob"),
        user(MALLORY, "mallory"),
    ];
    users.extend((CROWD_START..CROWD_START + CROWD_SIZE).map(|id| user(id, &format!("user{id}"))));
    users
}

pub fn food(id: i64, price: i64, stock: i64) -> Food {
    Food { id, price, stock }
}

pub fn foods() -> Vec<Food> {
    vec![
        food(3, 120, 10),
        food(5, 80, 10),
        food(7, 500, 2),
        food(8, 300, 0),
        food(SCARCE_FOOD, 1000, SCARCE_STOCK),
    ]
}

pub fn source() -> StaticCatalogSource {
    StaticCatalogSource::new(users(), foods())
}

/// Boot a marketplace over a fresh in-memory store.
pub async fn setup() -> (Arc<Marketplace>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let marketplace = boot_over(store.clone()).await;
    (marketplace, store)
}

/// Boot a marketplace with the fixture catalog over `store`.
pub async fn boot_over(store: Arc<dyn KeyValueStore>) -> Arc<Marketplace> {
    food_order_core::init_tracing();
    let marketplace = Marketplace::boot(store, &source(), AdminPolicy::default())
        .await
        .expect("Failed to boot marketplace");
    Arc::new(marketplace)
}
