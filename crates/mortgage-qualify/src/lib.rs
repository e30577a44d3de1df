pub mod config;
pub mod error;
pub mod qualification;
pub mod telemetry;
