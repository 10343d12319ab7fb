//! Total-cost arithmetic over calendar months.
//!
//! A subscription is active for every month in `start..=end` (or from
//! `start` onwards when open-ended). For a query period it contributes
//! `price * months`, where `months` counts the months shared by its active
//! range and the period, both ends inclusive. Ranges that do not meet,
//! including an inverted period, share zero months.

use std::cmp::{max, min};

use models::MonthYear;

use crate::errors::ServiceError;

use super::domain::{field_error, Subscription, SubscriptionFilter};

/// Inclusive month range a total is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: MonthYear,
    pub end: MonthYear,
}

/// Everything the aggregate needs: the period and the conjunctive filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostQuery {
    pub period: Period,
    pub filter: SubscriptionFilter,
}

impl Period {
    /// Parse both `MM-YYYY` boundaries. An inverted range is accepted.
    pub fn parse(period_start: &str, period_end: &str) -> Result<Self, ServiceError> {
        let start = period_start.trim().parse().map_err(field_error("period_start"))?;
        let end = period_end.trim().parse().map_err(field_error("period_end"))?;
        Ok(Self { start, end })
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Months shared by `[active_start, active_end or unbounded]` and this period.
    pub fn months_active(&self, active_start: MonthYear, active_end: Option<MonthYear>) -> i64 {
        let lo = max(active_start, self.start);
        let hi = active_end.map_or(self.end, |end| min(end, self.end));
        lo.months_through(&hi)
    }
}

pub fn subscription_cost(sub: &Subscription, period: &Period) -> i64 {
    i64::from(sub.price) * period.months_active(sub.start_date, sub.end_date)
}

/// Sum of `price * months_active` over the subscriptions matching `query.filter`.
/// Exceeding `i64` is a store error, as with postgres `bigint`.
pub fn total_cost<'a, I>(subs: I, query: &CostQuery) -> Result<i64, ServiceError>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    subs.into_iter()
        .filter(|s| query.filter.matches(s))
        .map(|s| subscription_cost(s, &query.period))
        .try_fold(0i64, |acc, c| {
            acc.checked_add(c).ok_or_else(|| ServiceError::Db("total overflow".into()))
        })
}
