// Presentation layer - HTTP surface and chart rendering
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod router;
pub mod terminal_chart;
