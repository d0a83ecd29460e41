use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;

/// Process-local repository. Keyed by id in a `BTreeMap` so listing is
/// naturally ascending by id, matching the store-backed variant.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<BTreeMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(DomainError::AlreadyExists);
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id()) {
            Some(existing) => {
                *existing = order.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.orders
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.read().await.values().cloned().collect())
    }
}
