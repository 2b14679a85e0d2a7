use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use super::routes;
use super::state::DashboardState;
use super::websocket;

pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        // Page shell
        .route("/", get(routes::index))
        // Panel partials
        .route("/panels/stats", get(routes::stats_panel))
        .route("/panels/messages", get(routes::messages_panel))
        // Pagination controls
        .route("/panels/messages/page", post(routes::set_page))
        .route("/panels/messages/size", post(routes::set_page_size))
        // Change notifications
        .route("/api/events", get(websocket::ws_handler))
        .with_state(state)
}

/// Start the Axum web dashboard server on the given port.
///
/// This runs as a background tokio task alongside the REPL.
pub async fn start_dashboard(state: Arc<DashboardState>, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("web dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
