// Infrastructure layer - External dependencies and adapters
pub mod artifacts;
pub mod config;
pub mod error;
pub mod github_client;
pub mod link_header;
pub mod page_client;
