// Domain layer - Entities shared by the pipeline and the dashboard
pub mod deployment;
pub mod repository;
pub mod settings;
