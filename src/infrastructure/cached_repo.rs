use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;

use super::order_cache::OrderCache;

/// Cache-aside in front of a store repository.
///
/// The wrapped store is the source of truth. Reads consult the cache first
/// and write back on a miss; committed writes refresh the cache; deletes
/// invalidate it on a detached task. Cache failures never reach the caller,
/// and a cache hit is returned without touching the store, so a value may be
/// stale until its TTL runs out. `list` always goes to the store.
pub struct CachedOrderRepository<R> {
    store: R,
    cache: OrderCache,
}

impl<R: OrderRepository> CachedOrderRepository<R> {
    pub fn new(store: R, cache: OrderCache) -> Self {
        Self { store, cache }
    }
}

#[async_trait]
impl<R: OrderRepository> OrderRepository for CachedOrderRepository<R> {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        self.store.create(order).await?;
        self.cache.refresh(order).await;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        if let Some(order) = self.cache.lookup(id).await {
            return Ok(order);
        }

        let order = self.store.get(id).await?;
        self.cache.refresh(&order).await;
        Ok(order)
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        self.store.update(order).await?;
        self.cache.refresh(order).await;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.store.delete(id).await?;
        // Detached: the handle is dropped and the caller does not wait.
        self.cache.invalidate_detached(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::infrastructure::cache::testing::{FailingCache, MemoryCache};
    use crate::infrastructure::cache::{CacheError, CacheStore};
    use crate::infrastructure::memory_repo::InMemoryOrderRepository;
    use crate::infrastructure::order_cache::{cache_key, CachePolicy};

    type Repo = CachedOrderRepository<Arc<InMemoryOrderRepository>>;

    fn cached(store: Arc<dyn CacheStore>) -> (Arc<InMemoryOrderRepository>, Repo) {
        let backing = Arc::new(InMemoryOrderRepository::new());
        let repo = CachedOrderRepository::new(
            Arc::clone(&backing),
            OrderCache::new(store, CachePolicy::default()),
        );
        (backing, repo)
    }

    fn order(item: &str, quantity: i32) -> Order {
        Order::new(Uuid::new_v4(), item, quantity).expect("valid order")
    }

    async fn wait_until_gone(mem: &MemoryCache, key: &str) {
        for _ in 0..50 {
            if !mem.contains(key) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn create_populates_cache_and_get_is_served_from_it() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());
        let o = order("widget", 3);

        repo.create(&o).await.expect("create failed");
        assert!(mem.contains(&cache_key(o.id())));

        assert_eq!(repo.get(o.id()).await.expect("get failed"), o);
        // Served from cache: no write-back.
        assert_eq!(mem.sets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_hit_is_returned_even_when_stale() {
        let mem = Arc::new(MemoryCache::new());
        let (backing, repo) = cached(mem.clone());
        let o = order("widget", 3);
        repo.create(&o).await.expect("create failed");

        // Change the store behind the cache's back.
        let revised = o.revise("widget", 9).expect("valid revision");
        backing.update(&revised).await.expect("direct update failed");

        assert_eq!(repo.get(o.id()).await.expect("get failed").quantity(), 3);
    }

    #[tokio::test]
    async fn cache_miss_falls_through_and_writes_back() {
        let mem = Arc::new(MemoryCache::new());
        let (backing, repo) = cached(mem.clone());
        let o = order("widget", 3);
        backing.create(&o).await.expect("create failed");

        assert_eq!(repo.get(o.id()).await.expect("get failed"), o);
        assert!(mem.contains(&cache_key(o.id())));
    }

    #[tokio::test]
    async fn corrupt_cache_entry_falls_through_to_store() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());
        let o = order("widget", 3);
        repo.create(&o).await.expect("create failed");
        mem.insert_raw(&cache_key(o.id()), b"{broken");

        assert_eq!(repo.get(o.id()).await.expect("get failed"), o);
        // Rewritten with a good copy after the fallthrough.
        let raw = mem.raw(&cache_key(o.id())).expect("entry rewritten");
        let decoded: Order = serde_json::from_slice(&raw).expect("valid entry");
        assert_eq!(decoded, o);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found_and_not_cached() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());
        let id = Uuid::new_v4();

        let err = repo.get(id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
        assert!(!mem.contains(&cache_key(id)));
    }

    #[tokio::test]
    async fn failed_create_leaves_cache_untouched() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());
        let o = order("widget", 3);
        repo.create(&o).await.expect("create failed");

        let err = repo.create(&o).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists));
        assert_eq!(mem.sets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_refreshes_previously_cached_value() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());
        let o = order("widget", 3);
        repo.create(&o).await.expect("create failed");
        repo.get(o.id()).await.expect("get failed");

        let revised = o.revise("gadget", 5).expect("valid revision");
        repo.update(&revised).await.expect("update failed");

        assert_eq!(repo.get(o.id()).await.expect("get failed"), revised);
    }

    #[tokio::test]
    async fn update_missing_is_not_found_and_nothing_cached() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());
        let ghost = order("ghost", 1);

        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
        assert!(!mem.contains(&cache_key(ghost.id())));
    }

    #[tokio::test]
    async fn delete_invalidates_cache_and_second_delete_is_not_found() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());
        let o = order("widget", 3);
        repo.create(&o).await.expect("create failed");

        repo.delete(o.id()).await.expect("delete failed");

        let key = cache_key(o.id());
        wait_until_gone(&mem, &key).await;
        assert!(!mem.contains(&key));
        assert!(matches!(repo.get(o.id()).await, Err(DomainError::NotFound)));
        assert!(matches!(repo.delete(o.id()).await, Err(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn failing_cache_does_not_affect_correctness() {
        let failing = Arc::new(FailingCache::new());
        let (_, repo) = cached(failing.clone());
        let o = order("widget", 3);

        repo.create(&o).await.expect("create failed");
        assert_eq!(repo.get(o.id()).await.expect("get failed"), o);

        let revised = o.revise("gadget", 5).expect("valid revision");
        repo.update(&revised).await.expect("update failed");
        assert_eq!(repo.get(o.id()).await.expect("get failed"), revised);

        repo.delete(o.id()).await.expect("delete failed");
        assert!(matches!(repo.get(o.id()).await, Err(DomainError::NotFound)));

        // Two attempts for each of create, get write-back, update, get write-back.
        assert_eq!(failing.sets.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn list_is_store_fresh_and_ordered_by_id() {
        let mem = Arc::new(MemoryCache::new());
        let (_, repo) = cached(mem.clone());

        assert!(repo.list().await.expect("list failed").is_empty());

        for i in 1..=5 {
            repo.create(&order("widget", i)).await.expect("create failed");
        }
        let gets_before = mem.gets.load(Ordering::SeqCst);

        let listed = repo.list().await.expect("list failed");
        let ids: Vec<Uuid> = listed.iter().map(Order::id).collect();
        let mut sorted = ids.clone();
        sorted.sort();

        assert_eq!(ids.len(), 5);
        assert_eq!(ids, sorted);
        assert_eq!(mem.gets.load(Ordering::SeqCst), gets_before);
    }

    /// Accepts every call and never answers.
    struct StalledCache;

    #[async_trait]
    impl CacheStore for StalledCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            std::future::pending().await
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            std::future::pending().await
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            std::future::pending().await
        }

        async fn ping(&self) -> Result<(), CacheError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_cache_never_fails_a_committed_write_or_a_read() {
        let (_, repo) = cached(Arc::new(StalledCache));
        let o = order("widget", 3);

        // Two attempts of 3 s with 100 ms between them.
        let started = tokio::time::Instant::now();
        repo.create(&o).await.expect("create failed");
        assert_eq!(started.elapsed(), Duration::from_millis(6_100));

        // Lookup times out, then the store answers and the write-back gives up.
        let started = tokio::time::Instant::now();
        assert_eq!(repo.get(o.id()).await.expect("get failed"), o);
        assert_eq!(started.elapsed(), Duration::from_millis(9_100));

        let revised = o.revise("gadget", 5).expect("valid revision");
        repo.update(&revised).await.expect("update failed");

        let started = tokio::time::Instant::now();
        repo.delete(o.id()).await.expect("delete failed");
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
