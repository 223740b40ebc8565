use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::store::keys;
use crate::{
    AddItemError, AdminPolicy, Cart, CartStore, Catalog, CatalogError, CatalogSource, Config,
    ErrorKind, FoodId, InventoryLedger, KeyValueStore, Order, OrderItem, OrderLedger,
    PostgresCatalogSource, RedisStore, StoreError, StoreResult, TokenCache, UserId,
};

/// Error type for boot. Any of these halts startup.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Wrong user name or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoginError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials => ErrorKind::Unauthorized,
            Self::Store(_) => ErrorKind::Backend,
        }
    }
}

/// Error type for [`Marketplace::place_order`], in detection order.
#[derive(Debug, thiserror::Error)]
pub enum PlaceOrderError {
    #[error("Each user may only place one order")]
    AlreadyOrdered,

    #[error("Cart not found")]
    CartNotFound,

    #[error("Not authorized to access cart")]
    NotOwner,

    #[error("Food {0} is out of stock")]
    OutOfStock(FoodId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PlaceOrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyOrdered => ErrorKind::Conflict,
            Self::CartNotFound => ErrorKind::NotFound,
            Self::NotOwner => ErrorKind::Unauthorized,
            Self::OutOfStock(_) => ErrorKind::ResourceExhausted,
            Self::Store(_) => ErrorKind::Backend,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AllOrdersError {
    #[error("Only the administrator may list all orders")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AllOrdersError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden => ErrorKind::Unauthorized,
            Self::Store(_) => ErrorKind::Backend,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub user_id: UserId,
    pub name: String,
    pub access_token: String,
}

/// Entry point for the request layer.
///
/// Owns the catalog snapshot and every store-backed component. All methods
/// take `&self` and may be called concurrently from any number of tasks.
pub struct Marketplace {
    catalog: Arc<Catalog>,
    tokens: TokenCache,
    carts: CartStore,
    inventory: InventoryLedger,
    orders: OrderLedger,
    admin: AdminPolicy,
}

impl Marketplace {
    /// Assemble the core over an already prepared store. Does not touch the
    /// inventory counters; see [`Marketplace::boot`].
    pub fn new(store: Arc<dyn KeyValueStore>, catalog: Arc<Catalog>, admin: AdminPolicy) -> Self {
        Self {
            tokens: TokenCache::new(store.clone()),
            carts: CartStore::new(store.clone(), catalog.clone()),
            inventory: InventoryLedger::new(store.clone()),
            orders: OrderLedger::new(store),
            catalog,
            admin,
        }
    }

    /// Discard state from a previous run, load the catalog and seed the
    /// inventory counters.
    pub async fn boot(
        store: Arc<dyn KeyValueStore>,
        source: &dyn CatalogSource,
        admin: AdminPolicy,
    ) -> Result<Self, BootError> {
        info!("Resetting key-value store");
        store.flush_all().await?;

        info!("Loading catalog");
        let catalog = Arc::new(Catalog::load(source).await?);

        let marketplace = Self::new(store, catalog, admin);
        marketplace.inventory.initialize(&marketplace.catalog).await?;
        info!(
            users = marketplace.catalog.user_count(),
            foods = marketplace.catalog.foods().len(),
            "Marketplace ready"
        );
        Ok(marketplace)
    }

    /// Connect to Redis and PostgreSQL as described by `config`, then boot.
    pub async fn connect(config: &Config) -> Result<Self, BootError> {
        let store = RedisStore::connect(&config.redis_url(), config.store_connect_timeout).await?;
        let source = PostgresCatalogSource::connect(&config.database_url()).await?;
        Self::boot(
            Arc::new(store),
            &source,
            AdminPolicy::new(config.admin_name.clone()),
        )
        .await
    }

    /// [`Marketplace::connect`] with settings from the environment.
    pub async fn from_env() -> Result<Self, BootError> {
        let config = Config::load()?;
        Self::connect(&config).await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn inventory(&self) -> &InventoryLedger {
        &self.inventory
    }

    /// Pre-rendered food list for read requests.
    pub fn catalog_json(&self) -> &str {
        self.catalog.foods_json()
    }

    /// Check credentials and mint an access token.
    pub async fn login(&self, name: &str, password: &str) -> Result<Login, LoginError> {
        let user = self
            .catalog
            .user_by_name(name)
            .filter(|user| user.password == password)
            .ok_or(LoginError::InvalidCredentials)?;

        let access_token = Uuid::new_v4().simple().to_string();
        self.tokens.bind(&access_token, user.id).await?;
        debug!(user_id = user.id, "User logged in");

        Ok(Login {
            user_id: user.id,
            name: user.name.clone(),
            access_token,
        })
    }

    /// Resolve an access token to its user.
    pub async fn authenticate(&self, access_token: &str) -> StoreResult<Option<UserId>> {
        self.tokens.resolve(access_token).await
    }

    pub async fn create_cart(&self, user_id: UserId) -> StoreResult<String> {
        self.carts.create(user_id).await
    }

    pub async fn add_to_cart(
        &self,
        cart_id: &str,
        user_id: UserId,
        food_id: FoodId,
        count: u32,
    ) -> Result<(), AddItemError> {
        self.carts.add_item(cart_id, user_id, food_id, count).await
    }

    /// Turn a cart into the user's single order.
    ///
    /// Lines are reserved in cart order. When a line overdraws its counter
    /// only that line is released; lines reserved before it stay taken.
    /// The existing-order check and the final write are separate store
    /// round-trips, so two concurrent calls for the same user can both
    /// succeed.
    pub async fn place_order(
        &self,
        cart_id: &str,
        user_id: UserId,
    ) -> Result<String, PlaceOrderError> {
        if self.orders.find_for_user(user_id).await?.is_some() {
            return Err(PlaceOrderError::AlreadyOrdered);
        }

        let cart = self
            .carts
            .load(cart_id)
            .await?
            .ok_or(PlaceOrderError::CartNotFound)?;
        if !cart.is_owned_by(user_id) {
            return Err(PlaceOrderError::NotOwner);
        }

        let total = self.order_total(&cart).ok_or_else(|| {
            StoreError::corrupt(&keys::cart(cart_id), "order total overflows")
        })?;

        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let remaining = self.inventory.reserve(line.food_id, line.quantity).await?;
            if remaining < 0 {
                self.inventory.release(line.food_id, line.quantity).await?;
                debug!(user_id, food_id = line.food_id, "Order rejected, out of stock");
                return Err(PlaceOrderError::OutOfStock(line.food_id));
            }
            items.push(OrderItem {
                food_id: line.food_id,
                count: line.quantity,
            });
        }

        let order = Order {
            user_id,
            id: self.orders.next_order_id(),
            items,
            total,
        };
        self.orders.record(&order).await?;
        info!(user_id, order_id = %order.id, total, "Order placed");

        Ok(order.id)
    }

    /// Sum of catalog price times quantity. `None` on overflow.
    fn order_total(&self, cart: &Cart) -> Option<i64> {
        cart.lines.iter().try_fold(0i64, |total, line| {
            let price = self.catalog.food(line.food_id).map_or(0, |food| food.price);
            price
                .checked_mul(i64::from(line.quantity))
                .and_then(|amount| total.checked_add(amount))
        })
    }

    /// The caller's own orders, zero or one.
    pub async fn own_orders(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        Ok(self.orders.find_for_user(user_id).await?.into_iter().collect())
    }

    /// Every order ever placed, for the administrator only.
    pub async fn all_orders(&self, requester: UserId) -> Result<Vec<Order>, AllOrdersError> {
        if !self.admin.is_admin(&self.catalog, requester) {
            debug!(requester, "Rejected order listing by non-admin");
            return Err(AllOrdersError::Forbidden);
        }
        Ok(self.orders.all().await?)
    }
}
