//! Service layer providing business-oriented operations on subscriptions.
//! - Validates raw input before anything reaches storage.
//! - Abstracts persistence behind `SubscriptionRepository` (SeaORM and in-memory).
//! - Owns the total-cost computation over calendar months.

pub mod errors;
pub mod subscription;
#[cfg(test)]
pub mod test_support;
