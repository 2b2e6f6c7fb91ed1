pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::handlers::AppServices;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub event_sender: EventSender,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, event_sender: EventSender) -> Self {
        let services = AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config: Arc::new(config),
            event_sender,
            services,
        }
    }
}

/// All API routes, still generic over state so tests can assemble the
/// app without the network layers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::orders::order_routes())
        .merge(handlers::customers::customer_routes())
        .merge(handlers::products::product_routes())
        .merge(handlers::health::health_routes())
}

/// The complete application router with state applied.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(api_routes())
        .merge(openapi::swagger_ui())
        .with_state(state)
}

async fn root() -> &'static str {
    "Storefront API. See /docs for the API reference."
}
