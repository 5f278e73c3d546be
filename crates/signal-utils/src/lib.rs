//! Shared utilities for the signal workspace
//!
//! This crate provides the functionality every binary in the workspace needs
//! before any analysis runs: logging setup and environment configuration.

pub mod config;
pub mod logging;

pub use config::{Config, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
