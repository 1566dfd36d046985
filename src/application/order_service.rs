use crate::domain::{Order, RepositoryError, SharedOrderRepository};

/// Thin orchestrator shared by the REST, GraphQL and gRPC adapters. It
/// forwards to whichever repository the configuration selected and never
/// reinterprets repository errors.
#[derive(Clone)]
pub struct OrderService {
    repo: SharedOrderRepository,
}

impl OrderService {
    pub fn new(repo: SharedOrderRepository) -> Self {
        Self { repo }
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        self.repo.list_orders()
    }

    pub fn create_order(&self, order: Order) -> Result<Order, RepositoryError> {
        self.repo.create_order(order)
    }

    pub fn get_order(&self, id: i32) -> Result<Order, RepositoryError> {
        self.repo.get_order_by_id(id)
    }

    pub fn update_order(&self, id: i32, order: Order) -> Result<Order, RepositoryError> {
        self.repo.update_order(id, order)
    }

    pub fn delete_order(&self, id: i32) -> Result<(), RepositoryError> {
        self.repo.delete_order(id)
    }
}
