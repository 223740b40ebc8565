use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::store::keys;
use crate::{Catalog, ErrorKind, FoodId, KeyValueStore, StoreError, StoreResult, UserId};

/// Maximum number of units a cart may hold across all lines.
pub const MAX_CART_UNITS: u32 = 3;

const OWNER_SEPARATOR: char = ';';
const ITEM_SEPARATOR: char = ',';
const FIELD_SEPARATOR: char = ':';

/// Error type for [`CartStore::add_item`], in detection order.
#[derive(Debug, thiserror::Error)]
pub enum AddItemError {
    #[error("Cart not found")]
    CartNotFound,

    #[error("Not authorized to access cart")]
    NotOwner,

    #[error("Food not found")]
    FoodNotFound,

    #[error("Cart may hold at most {} items", MAX_CART_UNITS)]
    OverCapacity,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AddItemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CartNotFound | Self::FoodNotFound => ErrorKind::NotFound,
            Self::NotOwner => ErrorKind::Unauthorized,
            Self::OverCapacity => ErrorKind::CapacityExceeded,
            Self::Store(_) => ErrorKind::Backend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub food_id: FoodId,
    pub quantity: u32,
}

/// Decoded cart record.
///
/// The owner is kept in the form it was stored in; ownership checks compare
/// that text case-insensitively against the requester's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub owner: String,
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner: owner.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner.eq_ignore_ascii_case(&user_id.to_string())
    }

    /// Sum of quantities across all lines.
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Merge `count` units of `food_id` into the cart, growing an existing
    /// line before appending a new one.
    pub fn add(&mut self, food_id: FoodId, count: u32) {
        match self.lines.iter_mut().find(|line| line.food_id == food_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(count),
            None => self.lines.push(CartLine {
                food_id,
                quantity: count,
            }),
        }
    }

    /// Render as `<owner>;<food>:<qty>,<food>:<qty>`.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse a stored record. `key` is only used for error reporting.
    pub fn decode(key: &str, record: &str) -> StoreResult<Self> {
        let (owner, items) = record
            .split_once(OWNER_SEPARATOR)
            .unwrap_or((record, ""));

        let mut lines = Vec::new();
        for item in items.split(ITEM_SEPARATOR).filter(|item| !item.is_empty()) {
            let (food_id, quantity) = item
                .split_once(FIELD_SEPARATOR)
                .ok_or_else(|| StoreError::corrupt(key, format!("malformed item {item:?}")))?;
            let food_id = food_id
                .parse::<FoodId>()
                .map_err(|_| StoreError::corrupt(key, format!("bad food id {food_id:?}")))?;
            let quantity = quantity
                .parse::<u32>()
                .map_err(|_| StoreError::corrupt(key, format!("bad quantity {quantity:?}")))?;
            lines.push(CartLine { food_id, quantity });
        }

        Ok(Self {
            owner: owner.to_string(),
            lines,
        })
    }
}

impl fmt::Display for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.owner, OWNER_SEPARATOR)?;
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                write!(f, "{ITEM_SEPARATOR}")?;
            }
            write!(f, "{}{}{}", line.food_id, FIELD_SEPARATOR, line.quantity)?;
        }
        Ok(())
    }
}

/// Cart persistence and mutation.
///
/// Records are always rewritten whole. There is no lock around the
/// read-modify-write in [`CartStore::add_item`]: concurrent additions to the
/// same cart race and the last write wins.
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<Catalog>,
}

impl CartStore {
    pub fn new(store: Arc<dyn KeyValueStore>, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Create an empty cart for `owner` and return its id.
    pub async fn create(&self, owner: UserId) -> StoreResult<String> {
        let cart_id = Uuid::new_v4().simple().to_string();
        self.save(&cart_id, &Cart::new(owner)).await?;
        debug!(%cart_id, owner, "Created cart");
        Ok(cart_id)
    }

    /// Load a cart. `None` when no record exists.
    pub async fn load(&self, cart_id: &str) -> StoreResult<Option<Cart>> {
        let key = keys::cart(cart_id);
        match self.store.get(&key).await? {
            Some(record) if !record.is_empty() => Cart::decode(&key, &record).map(Some),
            _ => Ok(None),
        }
    }

    pub async fn save(&self, cart_id: &str, cart: &Cart) -> StoreResult<()> {
        self.store.set(&keys::cart(cart_id), &cart.encode()).await
    }

    /// Add `count` units of `food_id` to a cart owned by `requester`.
    pub async fn add_item(
        &self,
        cart_id: &str,
        requester: UserId,
        food_id: FoodId,
        count: u32,
    ) -> Result<(), AddItemError> {
        let mut cart = self
            .load(cart_id)
            .await?
            .ok_or(AddItemError::CartNotFound)?;

        if !cart.is_owned_by(requester) {
            return Err(AddItemError::NotOwner);
        }
        if self.catalog.food(food_id).is_none() {
            return Err(AddItemError::FoodNotFound);
        }

        cart.add(food_id, count);
        if cart.total_units() > u64::from(MAX_CART_UNITS) {
            debug!(%cart_id, food_id, count, "Rejected cart addition over capacity");
            return Err(AddItemError::OverCapacity);
        }

        self.save(cart_id, &cart).await?;
        Ok(())
    }
}
