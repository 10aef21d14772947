// Application layer - Use cases over the storage traits
pub mod chart_poller;
pub mod chart_service;
pub mod count_recorder;
pub mod traffic_repository;
