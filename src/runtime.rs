//! Runtime glue that wires configuration, typed errors, telemetry, and the runner that
//! sequences catalog jobs.

pub mod config;
pub mod error;
pub mod runner;
pub mod telemetry;
