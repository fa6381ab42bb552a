//! # Chirpy HTTP Server Module
//!
//! Thin Axum layer over the record store and auth primitives.
//!
//! # Endpoints
//!
//! - `GET /api/healthz` - Health check
//! - `POST /api/chirps`, `GET /api/chirps`, `GET /api/chirps/:id`
//! - `POST /api/users`, `GET /api/users/me`, `POST /api/login`
//! - `GET /admin/metrics`, `GET /admin/stats`, `POST /admin/reset`
//! - `/app/*` - Static files (counted as file-server hits)

pub mod admin_routes;
pub mod chirp_routes;
pub mod config;
pub mod errors;
pub mod profanity;
pub mod server;
pub mod state;
pub mod user_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ErrorResponse};
pub use server::{build_router, HttpServer};
pub use state::AppState;
