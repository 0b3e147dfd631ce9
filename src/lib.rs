use std::error::Error;

use axum::Router;
use socketioxide::layer::SocketIoLayer;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod live;
pub mod r#match; // r# lets "match" be used as a module name
pub mod match_result;
pub mod message;
pub mod response;
pub mod routes;
pub mod standings;
pub mod state;

use config::Config;
use state::{AppState, SharedState};

/// Assembles the HTTP API, the uploaded file server and the socket.io layer.
pub fn app(state: SharedState, socket_layer: SocketIoLayer) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .nest("/api", routes::api())
        .nest_service(routes::upload::PUBLIC_PREFIX, uploads)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(socket_layer),
        )
}

pub fn build_app(config: Config) -> Result<(Router, SharedState), Box<dyn Error + Send + Sync>> {
    let (state, socket_layer) = AppState::new(config)?;
    Ok((app(state.clone(), socket_layer), state))
}

pub async fn start_server() -> Result<(), Box<dyn Error + Send + Sync>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    info!("Opening database {}", config.database_url);
    let address = format!("0.0.0.0:{}", config.port);
    let (app, _state) = build_app(config)?;

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
