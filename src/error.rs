/// Transport-independent classification of operation failures.
///
/// The dispatch layer maps these to status codes; every operation error in
/// this crate reports one through its `kind()` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cart or food does not exist.
    NotFound,
    /// Wrong cart owner, non-admin listing, bad token or credentials.
    Unauthorized,
    /// Cart would hold more than the allowed number of units.
    CapacityExceeded,
    /// The user already placed an order.
    Conflict,
    /// Not enough stock left.
    ResourceExhausted,
    /// The key-value backend failed.
    Backend,
}
