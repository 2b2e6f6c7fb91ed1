use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use storefront_api::config::{self, AppConfig};
use storefront_api::{db, events, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    info!(
        environment = %app_config.environment,
        "starting storefront-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db = db::establish_connection_from_app_config(&app_config)
        .await
        .context("failed to connect to the database")?;

    if app_config.auto_migrate {
        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;
    }

    let (event_sender, event_receiver) = events::event_channel(1024);
    tokio::spawn(events::process_events(event_receiver));

    let cors = build_cors_layer(&app_config);
    let addr = format!("{}:{}", app_config.host, app_config.port);
    let state = AppState::new(db, app_config, event_sender);

    let app = storefront_api::app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    if config.has_cors_allowed_origins() {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|origin| {
                let origin = origin.trim();
                if origin.is_empty() {
                    return None;
                }
                match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    } else if config.should_allow_permissive_cors() {
        CorsLayer::permissive()
    } else {
        warn!("no CORS origins configured; cross-origin requests will be rejected");
        CorsLayer::new()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
