use std::collections::BTreeMap;
use std::time::Duration;

use actix_web::{web, HttpResponse};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub details: BTreeMap<String, String>,
}

/// GET /health
///
/// Checks every registered dependency independently. Any failing probe makes
/// the whole service report `unhealthy` with a 503.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthResponse),
        (status = 503, description = "At least one dependency is unhealthy", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let checks = state.probes.iter().map(|probe| async move {
        let outcome = match tokio::time::timeout(PROBE_TIMEOUT, probe.check()).await {
            Ok(Ok(())) => "ok".to_string(),
            Ok(Err(reason)) => format!("unhealthy: {reason}"),
            Err(_) => "unhealthy: timed out".to_string(),
        };
        (probe.name().to_string(), outcome)
    });
    let details: BTreeMap<String, String> = join_all(checks).await.into_iter().collect();

    let healthy = details.values().all(|v| v == "ok");
    let body = HealthResponse {
        status: if healthy { "ok" } else { "unhealthy" }.to_string(),
        details,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        log::warn!("health check failed: {:?}", body.details);
        HttpResponse::ServiceUnavailable().json(body)
    }
}
