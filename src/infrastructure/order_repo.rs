use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::models::OrderRow;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => DomainError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DomainError::AlreadyExists
            }
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                DomainError::Unavailable(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Unavailable(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Postgres-backed store. Every write runs in its own transaction; wrap it in
/// a `CachedOrderRepository` for cache-aside reads.
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs `f` with a pooled connection on the blocking thread pool.
    async fn run<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
    }
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        let row = OrderRow::from(order);
        self.run(move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                diesel::insert_into(orders::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        let row = self
            .run(move |conn| {
                Ok(orders::table
                    .find(id)
                    .select(OrderRow::as_select())
                    .first::<OrderRow>(conn)
                    .optional()?)
            })
            .await?;

        Order::try_from(row.ok_or(DomainError::NotFound)?)
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let row = OrderRow::from(order);
        self.run(move |conn| {
            // Returning an error from the closure rolls the transaction back.
            conn.transaction::<_, DomainError, _>(|conn| {
                let affected = diesel::update(orders::table.find(row.id))
                    .set(&row)
                    .execute(conn)?;
                if affected == 0 {
                    return Err(DomainError::NotFound);
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.run(move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let affected = diesel::delete(orders::table.find(id)).execute(conn)?;
                if affected == 0 {
                    return Err(DomainError::NotFound);
                }
                Ok(())
            })
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        let rows = self
            .run(|conn| {
                Ok(orders::table
                    .select(OrderRow::as_select())
                    .order(orders::id.asc())
                    .load::<OrderRow>(conn)?)
            })
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
