//! Teller portal service - authentication, user administration, and the
//! warehouse chatbot.
//!
//! This crate provides the backend for the internal banking portal:
//! - JWT authentication backed by an argon2-hashed credential store
//! - User and role administration with RBAC
//! - A keyword-triggered chatbot that summarizes warehouse data through a
//!   hosted text-generation API
//!
//! ## Architecture
//!
//! ```text
//! Staff → Portal (auth → RBAC check) → chat pipeline
//!                                        router → fetcher → composer → generation (retry)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod auth;
pub mod chat;
pub mod db;
pub mod generate;
pub mod role;
pub mod routes;
pub mod user;
pub mod warehouse;

pub use chat::ChatService;
pub use generate::{CohereClient, GenerationClient, GenerationError, RetryConfig, RetryingClient};
pub use warehouse::{Row, SqliteWarehouse, Warehouse};

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use teller_common::config::Config;
use tower_http::cors::{Any, CorsLayer};

/// Build the portal router against the configured warehouse and generation
/// service.
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    let warehouse = Arc::new(SqliteWarehouse::open(&config.warehouse_db_path())?);

    let generator: Arc<dyn GenerationClient> = Arc::new(RetryingClient::new(
        Arc::new(CohereClient::new(&config.generation)),
        RetryConfig::from_config(&config.generation),
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = routes::build_routes(config, config.portal_db_path(), warehouse, generator);
    Ok(router.layer(cors))
}

/// Start the portal server.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let router = build_router(config)?;

    tracing::info!("Starting Teller portal on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
