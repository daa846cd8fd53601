//! Port traits for the service's external collaborators.

pub mod cache_port;
pub mod chart_port;
pub mod config_port;
pub mod data_port;
