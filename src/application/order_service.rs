use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Assigns a fresh id and persists the order. Invalid input is rejected
    /// before the repository is touched.
    pub async fn create_order(
        &self,
        item: impl Into<String>,
        quantity: i32,
    ) -> Result<Order, DomainError> {
        let order = Order::new(Uuid::new_v4(), item, quantity)?;
        self.repo.create(&order).await?;
        Ok(order)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.get(id).await
    }

    pub async fn update_order(
        &self,
        id: Uuid,
        item: impl Into<String>,
        quantity: i32,
    ) -> Result<Order, DomainError> {
        let current = self.repo.get(id).await?;
        let updated = current.revise(item, quantity)?;
        self.repo.update(&updated).await?;
        Ok(updated)
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id).await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.repo.list().await
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::domain::ports::MockOrderRepository;
    use crate::infrastructure::memory_repo::InMemoryOrderRepository;

    fn service() -> OrderService<InMemoryOrderRepository> {
        OrderService::new(InMemoryOrderRepository::new())
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let svc = service();

        let created = svc.create_order("widget", 3).await.expect("create failed");
        let id = created.id();

        let fetched = svc.get_order(id).await.expect("get failed");
        assert_eq!(fetched.item(), "widget");
        assert_eq!(fetched.quantity(), 3);

        let updated = svc.update_order(id, "gadget", 5).await.expect("update failed");
        assert_eq!(updated.id(), id);
        assert_eq!(updated.item(), "gadget");
        assert_eq!(updated.quantity(), 5);

        svc.delete_order(id).await.expect("delete failed");
        assert!(matches!(svc.get_order(id).await, Err(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let svc = service();
        let a = svc.create_order("widget", 1).await.expect("create failed");
        let b = svc.create_order("widget", 1).await.expect("create failed");
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_repository() {
        let mut repo = MockOrderRepository::new();
        repo.expect_create().never();
        let svc = OrderService::new(repo);

        let err = svc.create_order("", 1).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrderData(_)));

        let err = svc.create_order("widget", 0).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrderData(_)));
    }

    #[tokio::test]
    async fn update_of_missing_order_is_not_found() {
        let mut repo = MockOrderRepository::new();
        let id = Uuid::new_v4();
        repo.expect_get()
            .with(eq(id))
            .times(1)
            .returning(|_| Err(DomainError::NotFound));
        repo.expect_update().never();
        let svc = OrderService::new(repo);

        let err = svc.update_order(id, "gadget", 5).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn invalid_update_never_reaches_repository() {
        let mut repo = MockOrderRepository::new();
        let current = Order::new(Uuid::new_v4(), "widget", 3).expect("valid order");
        let id = current.id();
        repo.expect_get()
            .with(eq(id))
            .returning(move |_| Ok(current.clone()));
        repo.expect_update().never();
        let svc = OrderService::new(repo);

        let err = svc.update_order(id, "gadget", -2).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrderData(_)));

        let err = svc.update_order(id, " ", 2).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrderData(_)));
    }

    #[tokio::test]
    async fn update_passes_revised_order_to_repository() {
        let mut repo = MockOrderRepository::new();
        let current = Order::new(Uuid::new_v4(), "widget", 3).expect("valid order");
        let id = current.id();
        repo.expect_get().returning(move |_| Ok(current.clone()));
        repo.expect_update()
            .withf(move |o| o.id() == id && o.item() == "gadget" && o.quantity() == 5)
            .times(1)
            .returning(|_| Ok(()));
        let svc = OrderService::new(repo);

        svc.update_order(id, "gadget", 5).await.expect("update failed");
    }

    #[tokio::test]
    async fn list_on_empty_repository_is_empty() {
        let orders = service().list_orders().await.expect("list failed");
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let svc = service();
        let order = svc.create_order("widget", 1).await.expect("create failed");

        svc.delete_order(order.id()).await.expect("first delete failed");
        let err = svc.delete_order(order.id()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }
}
