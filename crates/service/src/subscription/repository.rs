use async_trait::async_trait;

use crate::errors::ServiceError;

use super::cost::CostQuery;
use super::domain::{Subscription, SubscriptionData, SubscriptionFilter};

/// Repository abstraction for subscription persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new row; the store assigns the id.
    async fn create(&self, data: &SubscriptionData) -> Result<Subscription, ServiceError>;
    async fn get_by_id(&self, id: i32) -> Result<Option<Subscription>, ServiceError>;
    /// Replace every mutable field; `None` when no row has this id.
    async fn update(&self, id: i32, data: &SubscriptionData) -> Result<Option<Subscription>, ServiceError>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, ServiceError>;
    async fn aggregate_total_cost(&self, query: &CostQuery) -> Result<i64, ServiceError>;
}

/// Process-local repository for tests, doc examples and running without a database.
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    use crate::subscription::cost;

    #[derive(Default)]
    struct Inner {
        last_id: i32,
        rows: BTreeMap<i32, Subscription>, // key: id
    }

    #[derive(Default)]
    pub struct InMemorySubscriptionRepository {
        inner: Mutex<Inner>,
    }

    impl InMemorySubscriptionRepository {
        pub fn new() -> Self { Self::default() }

        fn lock(&self) -> Result<MutexGuard<'_, Inner>, ServiceError> {
            self.inner.lock().map_err(|_| ServiceError::Db("in-memory store poisoned".into()))
        }
    }

    #[async_trait]
    impl SubscriptionRepository for InMemorySubscriptionRepository {
        async fn create(&self, data: &SubscriptionData) -> Result<Subscription, ServiceError> {
            let mut inner = self.lock()?;
            let id = inner
                .last_id
                .checked_add(1)
                .ok_or_else(|| ServiceError::Db("id sequence exhausted".into()))?;
            inner.last_id = id;
            let sub = Subscription::from_data(id, data.clone());
            inner.rows.insert(id, sub.clone());
            Ok(sub)
        }

        async fn get_by_id(&self, id: i32) -> Result<Option<Subscription>, ServiceError> {
            Ok(self.lock()?.rows.get(&id).cloned())
        }

        async fn update(&self, id: i32, data: &SubscriptionData) -> Result<Option<Subscription>, ServiceError> {
            let mut inner = self.lock()?;
            let Some(row) = inner.rows.get_mut(&id) else { return Ok(None); };
            *row = Subscription::from_data(id, data.clone());
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.lock()?.rows.remove(&id).is_some())
        }

        async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, ServiceError> {
            let inner = self.lock()?;
            Ok(inner.rows.values().filter(|s| filter.matches(s)).cloned().collect())
        }

        async fn aggregate_total_cost(&self, query: &CostQuery) -> Result<i64, ServiceError> {
            let inner = self.lock()?;
            cost::total_cost(inner.rows.values(), query)
        }
    }
}
