use crate::{Catalog, UserId};

/// Name of the privileged account unless configured otherwise.
pub const DEFAULT_ADMIN_NAME: &str = "root";

/// Decides whether a user is the administrator.
#[derive(Debug, Clone)]
pub struct AdminPolicy {
    admin_name: String,
}

impl AdminPolicy {
    pub fn new(admin_name: impl Into<String>) -> Self {
        Self {
            admin_name: admin_name.into(),
        }
    }

    /// True only for a known user whose name is the admin name.
    pub fn is_admin(&self, catalog: &Catalog, user_id: UserId) -> bool {
        catalog
            .user(user_id)
            .is_some_and(|user| user.name == self.admin_name)
    }
}

impl Default for AdminPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_NAME)
    }
}
