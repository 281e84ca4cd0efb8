pub mod backend;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod session;
pub mod telemetry;
