//! Food Order Core
//!
//! Session, cart and order transaction core for a constrained-inventory
//! marketplace. Shared state lives in a key-value store; the catalog is an
//! immutable snapshot loaded once at boot.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod marketplace;
pub mod memory_store;
pub mod order;
pub mod postgres_catalog;
pub mod redis_store;
pub mod store;
pub mod telemetry;
pub mod token_cache;

pub use auth::AdminPolicy;
pub use cart::{AddItemError, Cart, CartLine, CartStore, MAX_CART_UNITS};
pub use catalog::{Catalog, CatalogError, CatalogSource, Food, FoodId, User, UserId};
pub use config::{Config, ConfigError};
pub use error::ErrorKind;
pub use inventory::InventoryLedger;
pub use marketplace::{AllOrdersError, BootError, Login, LoginError, Marketplace, PlaceOrderError};
pub use memory_store::MemoryStore;
pub use order::{Order, OrderItem, OrderLedger};
pub use postgres_catalog::PostgresCatalogSource;
pub use redis_store::RedisStore;
pub use store::{KeyValueStore, StoreError, StoreResult};
pub use telemetry::init_tracing;
pub use token_cache::TokenCache;
