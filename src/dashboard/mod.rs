//! Local web rendition of the dashboard.
//!
//! Serves the page shell (stats block above the message log) plus HTML
//! partials for each panel, and pushes panel notifications over a WebSocket
//! so open pages know when to re-request a partial.

pub mod routes;
pub mod server;
pub mod state;
pub mod templates;
pub mod websocket;

pub use server::{router, start_dashboard};
pub use state::DashboardState;
