use diesel::dsl::exists;
use diesel::prelude::*;

use crate::config::DatabaseConfig;
use crate::db::{self, SqlitePool};
use crate::domain::{Order, OrderRepository, RepositoryError};
use crate::schema::orders;

use super::models::{NewOrderRow, OrderRow};

diesel::define_sql_function! {
    fn last_insert_rowid() -> BigInt;
}

/// SQLite backend over a single database file. Ids are read back with
/// `last_insert_rowid()` on the same connection as the insert.
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Two-phase construction: validate + open the pool, then run pending
    /// migrations. Either phase failing means no repository.
    pub fn connect(cfg: &DatabaseConfig) -> Result<Self, RepositoryError> {
        cfg.validate()?;
        let pool = db::open_sqlite(cfg)?;
        db::run_sqlite_migrations(&pool)?;
        Ok(Self::new(pool))
    }

    /// Drops the pool, closing its connections. Dropping the repository
    /// does the same; this just makes the hand-off explicit.
    pub fn close(self) {}
}

impl OrderRepository for SqliteOrderRepository {
    fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .select(OrderRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    fn create_order(&self, order: Order) -> Result<Order, RepositoryError> {
        order.validate()?;
        let mut conn = self.pool.get()?;

        if order.id != 0 {
            let taken: bool = diesel::select(exists(orders::table.find(order.id)))
                .get_result(&mut conn)?;
            if taken {
                return Err(RepositoryError::AlreadyExists);
            }
        }

        // Insert and rowid lookup stay on the same pooled connection.
        diesel::insert_into(orders::table)
            .values(NewOrderRow::from(&order))
            .execute(&mut conn)?;
        let id: i64 = diesel::select(last_insert_rowid()).get_result(&mut conn)?;

        Ok(Order {
            id: id as i32,
            ..order
        })
    }

    fn get_order_by_id(&self, id: i32) -> Result<Order, RepositoryError> {
        let mut conn = self.pool.get()?;
        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }

    fn update_order(&self, id: i32, order: Order) -> Result<Order, RepositoryError> {
        order.validate()?;
        let mut conn = self.pool.get()?;
        let affected = diesel::update(orders::table.find(id))
            .set((
                orders::item.eq(&order.item),
                orders::amount.eq(order.amount),
            ))
            .execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(Order { id, ..order })
    }

    fn delete_order(&self, id: i32) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get()?;
        let affected = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::Driver;

    fn config_in(dir: &TempDir) -> DatabaseConfig {
        DatabaseConfig {
            driver: Driver::Sqlite,
            sqlite_path: dir
                .path()
                .join("orders.sqlite")
                .to_string_lossy()
                .into_owned(),
            ..DatabaseConfig::default()
        }
    }

    fn setup_repo(dir: &TempDir) -> SqliteOrderRepository {
        SqliteOrderRepository::connect(&config_in(dir)).expect("connect failed")
    }

    #[test]
    fn missing_path_rejected_before_connecting() {
        let cfg = DatabaseConfig {
            driver: Driver::Sqlite,
            ..DatabaseConfig::default()
        };
        assert!(matches!(
            SqliteOrderRepository::connect(&cfg),
            Err(RepositoryError::Config(_))
        ));
    }

    #[test]
    fn migrations_are_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
        repo.create_order(Order::new("Bag", 2.0)).expect("create failed");
        repo.close();

        // Reconnecting against a current schema re-runs nothing and keeps
        // the data.
        let repo = setup_repo(&dir);
        assert_eq!(repo.list_orders().expect("list failed").len(), 1);
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);

        let bag = repo.create_order(Order::new("Bag", 2.0)).expect("create failed");
        assert_eq!(bag.id, 1);
        let shoe = repo
            .create_order(Order::new("Shoe", 49.99))
            .expect("create failed");
        assert_eq!(shoe.id, 2);
    }

    #[test]
    fn create_rejects_invalid_orders() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
        assert!(matches!(
            repo.create_order(Order::new("", 2.0)),
            Err(RepositoryError::InvalidEntity)
        ));
        assert!(matches!(
            repo.create_order(Order::new("Bag", -3.0)),
            Err(RepositoryError::InvalidEntity)
        ));
        assert!(repo.list_orders().expect("list failed").is_empty());
    }

    #[test]
    fn create_rejects_colliding_caller_id() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
        let bag = repo.create_order(Order::new("Bag", 2.0)).unwrap();

        let mut colliding = Order::new("Shoe", 49.99);
        colliding.id = bag.id;
        assert!(matches!(
            repo.create_order(colliding),
            Err(RepositoryError::AlreadyExists)
        ));
    }

    #[test]
    fn get_returns_what_was_created() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
        let created = repo.create_order(Order::new("Bag", 2.0)).unwrap();
        let fetched = repo.get_order_by_id(created.id).expect("get failed");
        assert_eq!(fetched, created);
    }

    #[test]
    fn get_missing_id_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
        assert!(matches!(
            repo.get_order_by_id(404),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn update_overwrites_fields_and_keeps_id() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
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
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
        assert!(matches!(
            repo.update_order(404, Order::new("Bag", 2.0)),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn second_delete_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let repo = setup_repo(&dir);
        let created = repo.create_order(Order::new("Bag", 2.0)).unwrap();
        repo.delete_order(created.id).expect("delete failed");
        assert!(matches!(
            repo.delete_order(created.id),
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.get_order_by_id(created.id),
            Err(RepositoryError::NotFound)
        ));
    }
}
