use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::state::DashboardState;
use super::templates;
use crate::pagination::PageSize;

// ── GET / — full page ────────────────────────────────────────────────

pub async fn index(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let stats = state.stats.view().await;
    let messages = state.messages.view().await;
    templates::render_index(&state.backend_url, &stats, &messages)
}

// ── GET /panels/* — HTML partials for HTMX swap ─────────────────────

pub async fn stats_panel(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    Html(templates::render_stats(&state.stats.view().await))
}

pub async fn messages_panel(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    Html(render_messages(&state).await)
}

// ── POST /panels/messages/* — pagination controls ───────────────────

#[derive(Deserialize)]
pub struct PageForm {
    pub page: usize,
}

pub async fn set_page(
    State(state): State<Arc<DashboardState>>,
    Form(form): Form<PageForm>,
) -> Response {
    match state.messages.set_page(form.page).await {
        Ok(()) => Html(render_messages(&state).await).into_response(),
        Err(e) => {
            warn!("rejected page from web form: {}", e);
            bad_request(&e)
        }
    }
}

#[derive(Deserialize)]
pub struct SizeForm {
    pub size: usize,
}

pub async fn set_page_size(
    State(state): State<Arc<DashboardState>>,
    Form(form): Form<SizeForm>,
) -> Response {
    match PageSize::try_from(form.size) {
        Ok(size) => {
            state.messages.set_page_size(size).await;
            Html(render_messages(&state).await).into_response()
        }
        Err(e) => {
            warn!("rejected page size from web form: {}", e);
            bad_request(&e)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

async fn render_messages(state: &DashboardState) -> String {
    templates::render_messages(&state.messages.view().await, &state.page_sizes)
}

fn bad_request(e: &anyhow::Error) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(format!(
            r#"<div class="muted">{}</div>"#,
            html_escape(&e.to_string())
        )),
    )
        .into_response()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
