use std::collections::HashMap;

use parking_lot::Mutex;

use crate::domain::{Order, OrderRepository, RepositoryError};

/// In-process backend over a plain map. No durability, no I/O; the mutex
/// makes `&self` access safe across transport threads.
pub struct MemoryOrderRepository {
    orders: Mutex<HashMap<i32, Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderRepository for MemoryOrderRepository {
    fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.orders.lock().values().cloned().collect())
    }

    /// Next id is the current entry count + 1. Known quirk, kept on
    /// purpose: once deletes shrink the count below a prior maximum, a
    /// create can reassign an id that still names a live entry and
    /// replace it.
    fn create_order(&self, mut order: Order) -> Result<Order, RepositoryError> {
        order.validate()?;
        let mut orders = self.orders.lock();
        if order.id != 0 && orders.contains_key(&order.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        order.id = orders.len() as i32 + 1;
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn get_order_by_id(&self, id: i32) -> Result<Order, RepositoryError> {
        self.orders
            .lock()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn update_order(&self, id: i32, mut order: Order) -> Result<Order, RepositoryError> {
        order.validate()?;
        let mut orders = self.orders.lock();
        if !orders.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        order.id = id;
        orders.insert(id, order.clone());
        Ok(order)
    }

    fn delete_order(&self, id: i32) -> Result<(), RepositoryError> {
        match self.orders.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_list_delete_scenario() {
        let repo = MemoryOrderRepository::new();

        let bag = repo.create_order(Order::new("Bag", 2.0)).expect("create failed");
        assert_eq!(bag.id, 1);

        let shoe = repo
            .create_order(Order::new("Shoe", 49.99))
            .expect("create failed");
        assert_eq!(shoe.id, 2);

        let orders = repo.list_orders().expect("list failed");
        assert_eq!(orders.len(), 2);

        repo.delete_order(1).expect("delete failed");
        assert!(matches!(
            repo.get_order_by_id(1),
            Err(RepositoryError::NotFound)
        ));

        let survivor = repo.get_order_by_id(2).expect("get failed");
        assert_eq!(survivor.item, "Shoe");
        assert_eq!(survivor.amount, 49.99);
    }

    #[test]
    fn create_rejects_invalid_orders() {
        let repo = MemoryOrderRepository::new();
        assert!(matches!(
            repo.create_order(Order::new("", 2.0)),
            Err(RepositoryError::InvalidEntity)
        ));
        assert!(matches!(
            repo.create_order(Order::new("Bag", -1.0)),
            Err(RepositoryError::InvalidEntity)
        ));
        assert!(repo.list_orders().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_colliding_caller_id() {
        let repo = MemoryOrderRepository::new();
        repo.create_order(Order::new("Bag", 2.0)).unwrap();

        let mut colliding = Order::new("Shoe", 49.99);
        colliding.id = 1;
        assert!(matches!(
            repo.create_order(colliding),
            Err(RepositoryError::AlreadyExists)
        ));
    }

    #[test]
    fn get_returns_what_was_created() {
        let repo = MemoryOrderRepository::new();
        let created = repo.create_order(Order::new("Bag", 2.0)).unwrap();
        let fetched = repo.get_order_by_id(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn update_overwrites_fields_and_keeps_id() {
        let repo = MemoryOrderRepository::new();
        let created = repo.create_order(Order::new("Bag", 2.0)).unwrap();

        let updated = repo
            .update_order(created.id, Order::new("Backpack", 5.0))
            .expect("update failed");
        assert_eq!(updated.id, created.id);

        let fetched = repo.get_order_by_id(created.id).unwrap();
        assert_eq!(fetched.item, "Backpack");
        assert_eq!(fetched.amount, 5.0);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let repo = MemoryOrderRepository::new();
        assert!(matches!(
            repo.update_order(42, Order::new("Bag", 2.0)),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn update_rejects_invalid_orders() {
        let repo = MemoryOrderRepository::new();
        let created = repo.create_order(Order::new("Bag", 2.0)).unwrap();
        assert!(matches!(
            repo.update_order(created.id, Order::new("", 2.0)),
            Err(RepositoryError::InvalidEntity)
        ));
    }

    #[test]
    fn second_delete_is_not_found() {
        let repo = MemoryOrderRepository::new();
        let created = repo.create_order(Order::new("Bag", 2.0)).unwrap();
        repo.delete_order(created.id).unwrap();
        assert!(matches!(
            repo.delete_order(created.id),
            Err(RepositoryError::NotFound)
        ));
    }

    // Pins the count-derived identity scheme, reuse and all. If ids ever
    // become monotonic this test should fail and force a deliberate call.
    #[test]
    fn id_assignment_reuses_freed_ids() {
        let repo = MemoryOrderRepository::new();
        repo.create_order(Order::new("Bag", 2.0)).unwrap();
        repo.create_order(Order::new("Shoe", 49.99)).unwrap();
        repo.delete_order(1).unwrap();

        let third = repo.create_order(Order::new("Hat", 9.0)).unwrap();
        assert_eq!(third.id, 2, "count-based ids reassign after deletes");
        assert_eq!(repo.get_order_by_id(2).unwrap().item, "Hat");
    }
}
