use std::sync::Arc;

use super::errors::RepositoryError;
use super::order::Order;

/// The capability set every persistence backend must satisfy. All three
/// transports reach storage exclusively through this trait.
///
/// Calls are synchronous and may block on network I/O (SQL backends);
/// transports are responsible for moving them off their executors.
pub trait OrderRepository: Send + Sync + 'static {
    /// All stored orders, in unspecified order. Empty store yields an
    /// empty vec, never an error.
    fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Validates, assigns a fresh id and persists. A non-zero caller id is
    /// only consulted for the collision check; the backend always assigns.
    fn create_order(&self, order: Order) -> Result<Order, RepositoryError>;

    fn get_order_by_id(&self, id: i32) -> Result<Order, RepositoryError>;

    /// Overwrites `item`/`amount` for an existing id, preserving the id.
    fn update_order(&self, id: i32, order: Order) -> Result<Order, RepositoryError>;

    /// Removes the entry. Deleting an absent id fails with `NotFound`,
    /// including the second delete of the same id.
    fn delete_order(&self, id: i32) -> Result<(), RepositoryError>;
}

pub type SharedOrderRepository = Arc<dyn OrderRepository>;
