//! Shared building blocks for the subscriptions workspace:
//! HTTP payload types and tracing initialization.

pub mod types;
pub mod utils;
