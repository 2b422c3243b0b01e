//! Server mode
//!
//! Builds shared state, configures CORS and serves the API until Ctrl+C.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    http::{Method, header},
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api;
use crate::config::ApiConfig;
use crate::runtime::lifetime;

/// Build CORS middleware from configuration
///
/// An empty origin list accepts any origin, since the browser tracker runs on
/// the public marketing site. Credentials are never allowed.
fn build_cors_middleware(config: &ApiConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(3600);

    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let config = crate::config::get_config();

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;
    let state = startup.state;

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let api_config = config.api.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors_middleware(&api_config))
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(web::Data::new(state.clone()))
            .configure(api::configure)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .shutdown_timeout(lifetime::shutdown::SHUTDOWN_GRACE.as_secs())
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown complete");
        }
    }

    Ok(())
}
