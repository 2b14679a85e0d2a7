use askama::Template;

use crate::pagination::PageSize;
use crate::view::{Counter, MessageRow, MessagesView, StatsView};

// ── Askama Templates ─────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub backend_url: &'a str,
    pub stats_html: &'a str,
    pub messages_html: &'a str,
}

#[derive(Template)]
#[template(path = "partials/stats.html")]
pub struct StatsTemplate<'a> {
    pub loading: bool,
    pub counters: &'a [Counter],
}

pub struct SizeOption {
    pub value: usize,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "partials/messages.html")]
pub struct MessagesTemplate<'a> {
    pub rows: &'a [MessageRow],
    pub first_load: bool,
    pub loading: bool,
    pub page_number: usize,
    pub page_size: usize,
    pub previous_index: Option<usize>,
    pub next_index: usize,
    pub size_options: Vec<SizeOption>,
    pub range_label: String,
}

// ── Render helpers (called from routes.rs) ───────────────────────────

pub fn render_index(backend_url: &str, stats: &StatsView, messages: &MessagesView) -> axum::response::Html<String> {
    let stats_html = render_stats(stats);
    let messages_html = render_messages(messages, &PageSize::ALL);
    let template = IndexTemplate {
        backend_url,
        stats_html: &stats_html,
        messages_html: &messages_html,
    };
    axum::response::Html(template.render().unwrap_or_else(|e| {
        let msg = e
            .to_string()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        format!("<h1>Template error: {}</h1>", msg)
    }))
}

pub fn render_stats(view: &StatsView) -> String {
    let template = match view {
        StatsView::Loading => StatsTemplate { loading: true, counters: &[] },
        StatsView::Ready(counters) => StatsTemplate { loading: false, counters },
    };
    template.render().unwrap_or_default()
}

pub fn render_messages(view: &MessagesView, page_sizes: &[PageSize]) -> String {
    let index = view.pagination.page_index;
    let template = MessagesTemplate {
        rows: &view.rows,
        first_load: view.displayed.is_none(),
        loading: view.loading,
        page_number: view.page_number(),
        page_size: view.pagination.page_size.get(),
        previous_index: view.can_go_previous().then(|| index - 1),
        next_index: index + 1,
        size_options: page_sizes
            .iter()
            .map(|size| SizeOption {
                value: size.get(),
                selected: *size == view.pagination.page_size,
            })
            .collect(),
        range_label: view.range_label(),
    };
    template.render().unwrap_or_default()
}
