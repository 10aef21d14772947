// Domain layer - Pure data types and transformations
pub mod chart;
pub mod counts;
pub mod traffic;
