use dotenvy::dotenv;
use order_cache_service::{build_server, build_state, Config, StartupError};
use std::env;

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(log_level));

    let config = Config::from_env()?;
    let state = build_state(&config).await?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await?;
    log::info!("Server stopped");
    Ok(())
}
