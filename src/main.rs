use axum::{Extension, http::HeaderValue};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod dto;
mod error;
mod routes;
mod services;
mod store;

use config::Config;
use services::{
    auth_user::JwtKeys, fantasy::FantasyService, roster::RosterService, session::AuctionSession,
    state_machine::PlayerStateMachine,
};
use store::AuctionStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let store = AuctionStore::connect(&config)
        .await
        .expect("Could not connect to SQLite");
    info!("Connected to sqlite database.");

    let (tx, _rx) = broadcast::channel(256);
    let session = AuctionSession::new(PlayerStateMachine::new(store.clone()), config.offer_hold, tx.clone());
    let roster = RosterService::new(store.clone(), tx.clone());
    let fantasy = FantasyService::new(store.clone());

    let cors = match config.allowed_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new().allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid ALLOWED_ORIGIN: {}", e);
            CorsLayer::new().allow_origin(Any)
        }
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let app = routes::router()
        .layer(Extension(store))
        .layer(Extension(session))
        .layer(Extension(roster))
        .layer(Extension(fantasy))
        .layer(Extension(tx))
        .layer(Extension(JwtKeys::new(config.jwt_secret.as_bytes())))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Could not bind listener");
    info!("Started server on {}.", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down.");
}
