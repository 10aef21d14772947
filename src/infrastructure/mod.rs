// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_source;
pub mod sqlite_repository;
