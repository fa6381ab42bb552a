//! # HTTP Server
//!
//! Combines all routers into one Axum app and serves it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::admin_routes::{admin_routes, count_fileserver_hit, health_routes};
use super::chirp_routes::chirp_routes;
use super::config::HttpServerConfig;
use super::state::AppState;
use super::user_routes::user_routes;

/// HTTP server for chirpy
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over prepared state
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        let router = build_router(state, &config);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, database = %self.config.database_path.display(), "chirpy listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("chirpy stopped");
        Ok(())
    }
}

/// Build the combined router with all endpoints
pub fn build_router(state: AppState, config: &HttpServerConfig) -> Router {
    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Every request under /app counts as a file-server hit
    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.metrics),
            count_fileserver_hit,
        ));

    Router::new()
        .nest(
            "/api",
            health_routes().merge(chirp_routes()).merge(user_routes()),
        )
        .nest("/admin", admin_routes())
        .with_state(state)
        .merge(file_server)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
