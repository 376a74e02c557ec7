//! HTTP server startup

use crate::config::Config;
use crate::server::middleware::{AccessMiddleware, RequestIdMiddleware};
use crate::server::{build_state, routes, AppState};
use crate::utils::error::Result;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

/// Build state from configuration and serve until shutdown
pub async fn run_server(config: Config) -> Result<()> {
    let bind_address = config.server.bind_address();
    let workers = config.server.workers;

    let state = build_state(config).await?;

    info!("Starting server on {}", bind_address);
    serve(state, &bind_address, workers).await
}

/// Serve an already-built state (tests wire their own)
pub async fn serve(state: AppState, bind_address: &str, workers: usize) -> Result<()> {
    let data = web::Data::new(state);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure)
            // Later wraps run first: correlation id, tracing, then admission
            .wrap(AccessMiddleware)
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
    })
    .bind(bind_address)?;

    if workers > 0 {
        server = server.workers(workers);
    }

    server.run().await?;
    info!("Server stopped");
    Ok(())
}
