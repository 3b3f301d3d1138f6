//! Consumer-facing API: the `Workshop` service, configuration and CLI wiring.

pub mod cli;
pub mod config;
pub mod service;

pub use config::Config;
pub use service::{ServiceError, Workshop, WorkshopOptions};
