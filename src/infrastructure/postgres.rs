use diesel::dsl::exists;
use diesel::prelude::*;

use crate::config::DatabaseConfig;
use crate::db::{self, PgPool};
use crate::domain::{Order, OrderRepository, RepositoryError};
use crate::schema::orders;

use super::models::{NewOrderRow, OrderRow};

/// PostgreSQL backend. Ids come back from `INSERT .. RETURNING id` in the
/// same round trip.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Two-phase construction: validate + open the pool (pings, bounded by
    /// `db::OPERATION_TIMEOUT`), then run pending migrations. Either phase
    /// failing means no repository.
    pub fn connect(cfg: &DatabaseConfig) -> Result<Self, RepositoryError> {
        cfg.validate()?;
        let pool = db::open_postgres(cfg)?;
        db::run_postgres_migrations(&pool)?;
        Ok(Self::new(pool))
    }

    /// Drops the pool, closing its connections. Dropping the repository
    /// does the same; this just makes the hand-off explicit.
    pub fn close(self) {}
}

impl OrderRepository for PostgresOrderRepository {
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

        let id = diesel::insert_into(orders::table)
            .values(NewOrderRow::from(&order))
            .returning(orders::id)
            .get_result::<i32>(&mut conn)?;

        Ok(Order { id, ..order })
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
