//! Core utilities shared across the application:
//! - `config`: settings file and defaults
//! - `backoff`: retry policy and exponential backoff loop

pub mod backoff;
pub mod config;

pub use backoff::{retry_with_backoff, RetryFailure, RetryPolicy};
pub use config::Settings;
