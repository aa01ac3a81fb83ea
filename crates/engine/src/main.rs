//! Grimoire Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grimoire_engine::{api, App};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional; missing files are fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grimoire_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Grimoire Engine");

    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);

    let app = Arc::new(App::new());

    // The moderator UI is served from anywhere during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .merge(api::http::router())
        .merge(api::websocket::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app);

    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
