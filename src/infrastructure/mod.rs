pub mod cache;
pub mod cached_repo;
pub mod health;
pub mod memory_repo;
pub mod models;
pub mod order_cache;
pub mod order_repo;

pub use cache::{CacheError, CacheStore, RedisCache};
pub use cached_repo::CachedOrderRepository;
pub use health::{CacheProbe, HealthProbe, PostgresProbe};
pub use memory_repo::InMemoryOrderRepository;
pub use order_cache::{CachePolicy, OrderCache};
pub use order_repo::DieselOrderRepository;
