pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/metrics", get(routes::metrics::get_metrics))
        .route("/check-and-notify", post(routes::metrics::check_and_notify))
        .route("/notify", post(routes::notify::notify))
        .route("/send-to-thingspeak", post(routes::feed::send_to_thingspeak))
        .route("/stabilize", post(routes::stabilize::stabilize))
        .route("/whatsapp", post(routes::whatsapp::inbound))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the HTTP server on `host:port`.
pub async fn serve(app_state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the HTTP server on a pre-bound listener.
///
/// Lets the caller read the actual port first (useful when `port = 0` and
/// the OS picks a free one).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    let app = build_router(app_state);

    tracing::info!("climawatch listening on http://{local}");

    axum::serve(listener, app).await?;
    Ok(())
}
