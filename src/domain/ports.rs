use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::Order;

/// Persistence capability consumed by the order service.
///
/// Implementations must be safe under arbitrary concurrent invocation. They
/// impose no per-id serialization of their own: concurrent updates to the
/// same order race at the backing store and the last commit wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create(&self, order: &Order) -> Result<(), DomainError>;
    async fn get(&self, id: Uuid) -> Result<Order, DomainError>;
    async fn update(&self, order: &Order) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    /// All orders, ascending by id.
    async fn list(&self) -> Result<Vec<Order>, DomainError>;
}

#[async_trait]
impl<R: OrderRepository + ?Sized> OrderRepository for Arc<R> {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        (**self).create(order).await
    }

    async fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        (**self).get(id).await
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        (**self).update(order).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        (**self).delete(id).await
    }

    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        (**self).list().await
    }
}
