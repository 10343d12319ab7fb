//! Subscription module: three-layer architecture (domain, repository, service).
//!
//! `cost` holds the month-overlap arithmetic shared by the in-memory
//! repository and by tests that cross-check the SQL aggregate.

pub mod cost;
pub mod domain;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::SubscriptionService;
