//! Core domain types and logic.

pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod indicator;
pub mod metrics;
pub mod price;
pub mod regime;
pub mod series_service;
