// Presentation layer - HTTP handlers and the dashboard view model
pub mod app_state;
pub mod grid;
pub mod handlers;
