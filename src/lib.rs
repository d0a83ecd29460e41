pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, run_migrations, DbPool};
pub use errors::StartupError;
pub use handlers::AppState;

use crate::domain::ports::OrderRepository;
use crate::infrastructure::{
    CacheError, CacheProbe, CachedOrderRepository, DieselOrderRepository, OrderCache,
    PostgresProbe, RedisCache,
};

const CACHE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
        handlers::orders::list_orders,
        handlers::health::health,
    ),
    tags(
        (name = "orders", description = "Order management"),
        (name = "health", description = "Dependency health"),
    )
)]
pub struct ApiDoc;

/// Connect to Postgres (running migrations) and, when enabled, Redis, and
/// wire the repository, service and health probes together.
///
/// An unreachable cache is logged and the service runs store-only; an
/// unreachable database is fatal.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    run_migrations(&pool)?;

    let cache = if config.cache_enabled {
        let connect = tokio::time::timeout(
            CACHE_CONNECT_TIMEOUT,
            RedisCache::connect(&config.redis_url, config.cache.op_timeout),
        );
        match connect.await.unwrap_or(Err(CacheError::Timeout)) {
            Ok(redis) => {
                log::info!("Connected to cache at {}", config.redis_url);
                Some(OrderCache::new(Arc::new(redis), config.cache.clone()))
            }
            Err(e) => {
                log::warn!("Cache unavailable at {}, running without it: {e}", config.redis_url);
                None
            }
        }
    } else {
        log::info!("Cache disabled by configuration");
        None
    };

    let store = DieselOrderRepository::new(pool.clone());
    let repo: Arc<dyn OrderRepository> = match &cache {
        Some(cache) => Arc::new(CachedOrderRepository::new(store, cache.clone())),
        None => Arc::new(store),
    };

    let mut state = AppState::new(repo, config.request_timeout)
        .with_probe(Arc::new(PostgresProbe::new(pool)));
    if let Some(cache) = cache {
        state = state.with_probe(Arc::new(CacheProbe::new(cache)));
    }
    Ok(state)
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
