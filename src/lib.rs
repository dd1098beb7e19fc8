//! VANTAGE — Dashboard backend for a multi-symbol trading bot
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod metrics;
pub mod resolver;
pub mod source;
pub mod types;
