// Application layer - Use cases and the aggregation pipeline
pub mod aggregator;
pub mod dashboard_service;
pub mod hosting_api;
pub mod reconciler;
pub mod refresh_cache;
pub mod task_pool;
pub mod topic_filter;
