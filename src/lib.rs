//! chirpy - short text posts and user accounts over a single JSON file
//!
//! - `storage`: the record store and its on-disk document
//! - `auth`: password hashing and signed session tokens
//! - `http_server`: the Axum service layer
//! - `observability`: counters and tracing setup
//! - `cli`: the `chirpy` binary's commands

pub mod auth;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod storage;
