//! Cache-aside policy for orders.
//!
//! The cache is a disposable projection of the store: every method here is
//! best-effort, and nothing it does may change the outcome a caller sees.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::order::Order;

use super::cache::{CacheError, CacheStore};

pub const ORDER_CACHE_PREFIX: &str = "order:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    /// Total write attempts, including the first.
    pub write_attempts: u32,
    pub retry_delay: Duration,
    pub invalidation_timeout: Duration,
    /// Bound on each individual cache call. A call that outlives it counts
    /// as a failure.
    pub op_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            write_attempts: 2,
            retry_delay: Duration::from_millis(100),
            invalidation_timeout: Duration::from_secs(2),
            op_timeout: Duration::from_secs(3),
        }
    }
}

pub fn cache_key(id: Uuid) -> String {
    format!("{ORDER_CACHE_PREFIX}{id}")
}

#[derive(Clone)]
pub struct OrderCache {
    store: Arc<dyn CacheStore>,
    policy: CachePolicy,
}

impl OrderCache {
    pub fn new(store: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        Self { store, policy }
    }

    /// Looks the order up in the cache.
    ///
    /// Returns `None` on a miss, on a backend error (logged), and on an entry
    /// that cannot be decoded into a valid order; the latter is deleted so the
    /// next write repopulates it.
    pub async fn lookup(&self, id: Uuid) -> Option<Order> {
        let key = cache_key(id);
        let data = match self.bounded(self.store.get(&key)).await {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("cache get error for order {id}: {e}");
                return None;
            }
        };

        match decode(&data) {
            Ok(order) if order.id() == id => Some(order),
            Ok(order) => {
                log::warn!(
                    "cache entry {key} holds order {}; discarding",
                    order.id()
                );
                self.discard(&key).await;
                None
            }
            Err(reason) => {
                log::warn!("corrupt cache entry {key}: {reason}; discarding");
                self.discard(&key).await;
                None
            }
        }
    }

    /// Writes the order under its key, retrying with a fixed delay.
    ///
    /// Returns the last error once every attempt has failed.
    pub async fn store(&self, order: &Order) -> Result<(), CacheError> {
        let data = serde_json::to_vec(order)?;
        let key = cache_key(order.id());
        let attempts = self.policy.write_attempts.max(1);

        let mut attempt = 1;
        loop {
            let set = self.store.set(&key, data.clone(), self.policy.ttl);
            match self.bounded(set).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    log::debug!("cache set attempt {attempt}/{attempts} for {key} failed: {e}");
                    attempt += 1;
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
            }
        }
    }

    /// Refreshes the cached copy, logging rather than returning a failure.
    pub async fn refresh(&self, order: &Order) {
        if let Err(e) = self.store(order).await {
            log::warn!("cache set error for order {}: {e}", order.id());
        }
    }

    /// Deletes the cached copy on a detached task bounded by its own timeout.
    ///
    /// The task is not tied to the caller: dropping the caller's future, or
    /// the returned handle, does not stop it.
    pub fn invalidate_detached(&self, id: Uuid) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let timeout = self.policy.invalidation_timeout;
        tokio::spawn(async move {
            let key = cache_key(id);
            let result = match tokio::time::timeout(timeout, store.delete(&key)).await {
                Ok(result) => result,
                Err(_) => Err(CacheError::Timeout),
            };
            if let Err(e) = result {
                log::warn!("cache invalidation failed for order {id}: {e}");
            }
        })
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        self.bounded(self.store.ping()).await
    }

    async fn discard(&self, key: &str) {
        if let Err(e) = self.bounded(self.store.delete(key)).await {
            log::warn!("failed to delete cache entry {key}: {e}");
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.policy.op_timeout, call)
            .await
            .unwrap_or(Err(CacheError::Timeout))
    }
}

fn decode(data: &[u8]) -> Result<Order, String> {
    let order: Order = serde_json::from_slice(data).map_err(|e| e.to_string())?;
    order.validate().map_err(|e| e.to_string())?;
    Ok(order)
}
