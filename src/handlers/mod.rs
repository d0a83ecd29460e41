pub mod health;
pub mod orders;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use uuid::Uuid;

use crate::application::OrderService;
use crate::domain::errors::DomainError;
use crate::domain::ports::OrderRepository;
use crate::infrastructure::health::HealthProbe;

pub type SharedOrderService = OrderService<Arc<dyn OrderRepository>>;

/// Everything the handlers need, shared across actix workers.
pub struct AppState {
    pub orders: SharedOrderService,
    pub probes: Vec<Arc<dyn HealthProbe>>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(repo: Arc<dyn OrderRepository>, request_timeout: Duration) -> Self {
        Self {
            orders: OrderService::new(repo),
            probes: Vec::new(),
            request_timeout,
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    /// Runs `fut` under the per-request deadline.
    pub(crate) async fn within_deadline<T, F>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| DomainError::Timeout)?
    }
}

/// Registers every route on an actix `App` or test service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .service(
            web::scope("/orders")
                .route("", web::post().to(orders::create_order))
                .route("", web::get().to(orders::list_orders))
                .route("/{id}", web::get().to(orders::get_order))
                .route("/{id}", web::put().to(orders::update_order))
                .route("/{id}", web::delete().to(orders::delete_order)),
        );
}

pub(crate) fn parse_order_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|_| DomainError::InvalidId(raw.to_string()))
}
