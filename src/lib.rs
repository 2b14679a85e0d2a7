use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};

pub mod api;
pub mod config;
pub mod dashboard;
pub mod interface;
pub mod logger;
pub mod pagination;
pub mod panels;
pub mod utils;
pub mod view;

/// Run the application: load `.env`, load config, start logging, mount the
/// panels and hand the terminal to the REPL.
///
/// When `enable_web = true` in `admin-dashboard.toml`, the web dashboard is
/// spawned as a background task alongside the REPL, driving the same panels.
pub async fn run() -> Result<()> {
    // Load environment variables from .env (RUST_LOG)
    dotenv().ok();

    let config = config::AppConfig::load();
    let log_path = logger::init_tracing(&config.log_dir)?;
    info!(backend = %config.api_base_url, log = %log_path.display(), "starting admin dashboard");

    let api: Arc<dyn api::AdminApi> = Arc::new(
        api::HttpAdminApi::new(&config.api_base_url).context("Invalid backend configuration")?,
    );
    let stats = Arc::new(panels::StatsPanel::new(Arc::clone(&api)));
    let messages = Arc::new(panels::MessagePanel::new(api, config.default_page_size));

    if config.enable_web {
        let state = Arc::new(dashboard::DashboardState::new(
            Arc::clone(&stats),
            Arc::clone(&messages),
            &config.api_base_url,
        ));
        let port = config.web_port;
        println!("Web dashboard: http://127.0.0.1:{}", port);
        tokio::spawn(async move {
            if let Err(e) = dashboard::start_dashboard(state, port).await {
                error!("web dashboard stopped: {:#}", e);
            }
        });
    }

    interface::start_repl(&config, stats, messages).await
}

// Re-exports for library consumers: common useful types
pub use api::{AdminApi, HttpAdminApi, MessageRecord, StatsSnapshot};
pub use config::AppConfig;
pub use pagination::{PageEnd, PageQuery, PageSize, PaginationState};
pub use panels::{MessagePanel, PanelEvent, PanelKind, StatsPanel};
