use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::errors::ServiceError;

use super::cost::{CostQuery, Period};
use super::domain::{Subscription, SubscriptionData, SubscriptionFilter, SubscriptionInput};
use super::repository::SubscriptionRepository;

/// Subscription business service independent of web framework.
///
/// Every write is validated here before the repository sees it, so the
/// store never holds an empty name, a negative price or an end month
/// earlier than the start month.
pub struct SubscriptionService<R: SubscriptionRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: SubscriptionRepository + ?Sized> SubscriptionService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Validate and store a new subscription; the store assigns the id.
    ///
    /// # Examples
    /// ```
    /// use service::subscription::{SubscriptionService, domain::SubscriptionInput, repository::memory::InMemorySubscriptionRepository};
    /// use std::sync::Arc;
    /// let svc = SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::new()));
    /// let input = SubscriptionInput {
    ///     service_name: "Yandex Plus".into(),
    ///     price: 400,
    ///     user_id: "60601fee-2bf1-4721-ae6f-7636e79a0cba".into(),
    ///     start_date: "07-2025".into(),
    ///     end_date: None,
    /// };
    /// let created = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(created.id, 1);
    /// assert_eq!(created.start_date.to_string(), "07-2025");
    /// ```
    #[instrument(skip(self, input), fields(service_name = %input.service_name))]
    pub async fn create(&self, input: SubscriptionInput) -> Result<Subscription, ServiceError> {
        let data = SubscriptionData::try_from(input)?;
        let created = self.repo.create(&data).await?;
        info!(id = created.id, user_id = %created.user_id, "subscription_created");
        Ok(created)
    }

    pub async fn get(&self, id: i32) -> Result<Subscription, ServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("subscription", id))
    }

    /// Replace every mutable field of an existing subscription.
    #[instrument(skip(self, input), fields(id = id))]
    pub async fn update(&self, id: i32, input: SubscriptionInput) -> Result<Subscription, ServiceError> {
        let data = SubscriptionData::try_from(input)?;
        let updated = self
            .repo
            .update(id, &data)
            .await?
            .ok_or_else(|| ServiceError::not_found("subscription", id))?;
        info!(id, "subscription_updated");
        Ok(updated)
    }

    /// Deleting an id that does not exist is `NotFound`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("subscription", id));
        }
        info!(id, "subscription_deleted");
        Ok(())
    }

    pub async fn list(&self, filter: SubscriptionFilter) -> Result<Vec<Subscription>, ServiceError> {
        let rows = self.repo.list(&filter).await?;
        debug!(count = rows.len(), "subscriptions_listed");
        Ok(rows)
    }

    /// Sum of `price * months_active` over matching subscriptions.
    ///
    /// Periods are `MM-YYYY`; malformed input fails before the store is
    /// queried. An inverted period overlaps nothing and totals `0`.
    ///
    /// # Examples
    /// ```
    /// use service::subscription::{SubscriptionService, domain::SubscriptionInput, repository::memory::InMemorySubscriptionRepository};
    /// use std::sync::Arc;
    /// let svc = SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::new()));
    /// let user = "60601fee-2bf1-4721-ae6f-7636e79a0cba";
    /// let input = SubscriptionInput { service_name: "Yandex Plus".into(), price: 400, user_id: user.into(), start_date: "07-2025".into(), end_date: None };
    /// tokio_test::block_on(svc.create(input)).unwrap();
    /// let total = tokio_test::block_on(svc.calculate_total_cost("07-2025", "09-2025", Some(user), None)).unwrap();
    /// assert_eq!(total, 1200);
    /// ```
    #[instrument(skip(self))]
    pub async fn calculate_total_cost(
        &self,
        period_start: &str,
        period_end: &str,
        user_id: Option<&str>,
        service_name: Option<&str>,
    ) -> Result<i64, ServiceError> {
        let period = Period::parse(period_start, period_end)?;
        let filter = SubscriptionFilter::exact(user_id, service_name)?;
        if period.is_inverted() {
            debug!(%period_start, %period_end, "inverted period; no month can overlap");
        }
        let total = self.repo.aggregate_total_cost(&CostQuery { period, filter }).await?;
        info!(total_cost = total, "total_cost_calculated");
        Ok(total)
    }
}
